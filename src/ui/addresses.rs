use super::util::{display_amount, display_ether, display_usd, short_hex};
use crate::{
    app::{
        Action, AppContext, AppResult, AppView, BalanceRecord, InputFocus, Message, MountToken,
        Services,
        address_list::submit_address,
        portfolio::{Lookup, Portfolio, RowView},
    },
    components::Component,
};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Paragraph, Row, Table},
};
use std::time::{Duration, Instant};
use tokio::task::AbortHandle;

const COLUMNS: usize = 4;

/// The `/addresses/:addresses` view: add-address form plus the balance table.
pub struct AddressesView {
    services: Services,
    refresh_interval: Option<Duration>,
    mount: Option<MountToken>,
    portfolio: Portfolio,
    draft: String,
    tasks: Vec<AbortHandle>,
    last_refresh: Option<Instant>,
}

#[derive(Debug, Clone)]
pub enum AddressesCommand {
    FocusForm,
    InputChar(char),
    InsertText(String),
    Backspace,
    ClearDraft,
    Submit,
    Cancel,
    Refresh,
    AddressesChanged,
    PriceResolved {
        mount: MountToken,
        result: Result<Option<f64>, String>,
    },
    BalanceResolved {
        mount: MountToken,
        address: String,
        result: Result<BalanceRecord, String>,
    },
}

impl AddressesView {
    pub fn new(services: Services, refresh_interval: Option<Duration>) -> Self {
        Self {
            services,
            refresh_interval,
            mount: None,
            portfolio: Portfolio::default(),
            draft: String::new(),
            tasks: Vec::new(),
            last_refresh: None,
        }
    }

    pub fn is_mounted(&self) -> bool {
        self.mount.is_some()
    }

    pub fn command_from_key(event: KeyEvent) -> Option<AddressesCommand> {
        match (event.modifiers, event.code) {
            (_, KeyCode::Esc) => Some(AddressesCommand::Cancel),
            (_, KeyCode::Enter) => Some(AddressesCommand::Submit),
            (_, KeyCode::Backspace) => Some(AddressesCommand::Backspace),
            (KeyModifiers::CONTROL, KeyCode::Char('u')) => Some(AddressesCommand::ClearDraft),
            (modifiers, KeyCode::Char(c)) if !modifiers.contains(KeyModifiers::CONTROL) => {
                Some(AddressesCommand::InputChar(c))
            }
            _ => None,
        }
    }

    fn fetch_price(&mut self, ctx: &mut AppContext<'_>) {
        let Some(mount) = self.mount else {
            return;
        };
        if !self.portfolio.begin_price_fetch() {
            return;
        }
        log::debug!("requesting ether price");
        let services = self.services.clone();
        let handle = ctx.commands.spawn_async(move || async move {
            let result = services.fetch_price().await.map_err(|err| err.to_string());
            Message::PriceFetched { mount, result }
        });
        self.tasks.push(handle);
    }

    fn fetch_balance(&mut self, address: &str, ctx: &mut AppContext<'_>) {
        let Some(mount) = self.mount else {
            return;
        };
        if !self.portfolio.begin_balance_fetch(address) {
            return;
        }
        log::debug!("requesting balance for {address}");
        let services = self.services.clone();
        let address = address.to_string();
        let handle = ctx.commands.spawn_async(move || async move {
            let result = services
                .fetch_balance(&address)
                .await
                .map_err(|err| err.to_string());
            Message::BalanceFetched {
                mount,
                address,
                result,
            }
        });
        self.tasks.push(handle);
    }

    /// Balance fetches for listed addresses that have neither a record nor a request running.
    fn fetch_missing(&mut self, ctx: &mut AppContext<'_>) {
        let addresses = ctx.state.route.addresses();
        let missing: Vec<String> = self
            .portfolio
            .missing(&addresses)
            .into_iter()
            .map(str::to_string)
            .collect();
        for address in missing {
            self.fetch_balance(&address, ctx);
        }
    }

    fn refresh_all(&mut self, ctx: &mut AppContext<'_>) {
        self.tasks.retain(|task| !task.is_finished());
        self.fetch_price(ctx);
        for address in ctx.state.route.addresses() {
            self.fetch_balance(&address, ctx);
        }
        self.last_refresh = Some(Instant::now());
    }

    fn accepts(&self, mount: MountToken) -> bool {
        if self.mount == Some(mount) {
            return true;
        }
        log::debug!("dropping result from stale mount {mount:?}");
        false
    }

    fn row(view: RowView<'_>, refreshing: bool) -> Row<'static> {
        match view {
            RowView::Resolved {
                address,
                wei,
                price,
                usd,
                ..
            } => Row::new(vec![
                if refreshing {
                    format!("{address} ↻")
                } else {
                    address.to_string()
                },
                display_ether(wei),
                display_usd(price),
                display_usd(usd),
            ]),
            RowView::Loading { address } => Row::new(vec![
                address.to_string(),
                "Loading…".to_string(),
                String::new(),
                String::new(),
            ])
            .style(Style::default().fg(Color::DarkGray)),
            RowView::Failed { address, reason } => Row::new(vec![
                address.to_string(),
                "Lookup failed".to_string(),
                reason.to_string(),
                String::new(),
            ])
            .style(Style::default().fg(Color::Red)),
        }
    }

    fn price_label(&self) -> String {
        match self.portfolio.price_lookup() {
            Lookup::Succeeded(price) => format!("ETH {}", display_usd(*price)),
            Lookup::Pending => "ETH price loading…".to_string(),
            Lookup::Failed(reason) => format!("ETH price unavailable: {reason}"),
        }
    }
}

impl Component for AddressesView {
    type Command = AddressesCommand;

    /// Mount: take a fresh token and request the price plus every listed balance.
    fn init(&mut self, ctx: &mut AppContext<'_>) -> AppResult<()> {
        let mount = MountToken::next();
        log::info!("mounting addresses view ({mount:?})");
        self.mount = Some(mount);
        self.portfolio = Portfolio::default();
        self.refresh_all(ctx);
        Ok(())
    }

    fn teardown(&mut self, ctx: &mut AppContext<'_>) -> AppResult<()> {
        if let Some(mount) = self.mount.take() {
            log::info!("unmounting addresses view ({mount:?})");
        }
        for task in self.tasks.drain(..) {
            task.abort();
        }
        self.portfolio = Portfolio::default();
        self.draft.clear();
        self.last_refresh = None;
        if ctx.state.navigation.input == InputFocus::AddressForm {
            ctx.state.navigation.input = InputFocus::None;
        }
        Ok(())
    }

    fn update(
        &mut self,
        command: &Self::Command,
        ctx: &mut AppContext<'_>,
    ) -> AppResult<Option<Action>> {
        match command {
            AddressesCommand::FocusForm => {
                return Ok(Some(Action::Focus(InputFocus::AddressForm)));
            }
            AddressesCommand::InputChar(c) => self.draft.push(*c),
            AddressesCommand::InsertText(text) => {
                let cleaned: String = text
                    .chars()
                    .filter(|ch| !matches!(ch, '\r' | '\n'))
                    .collect();
                self.draft.push_str(&cleaned);
            }
            AddressesCommand::Backspace => {
                self.draft.pop();
            }
            AddressesCommand::ClearDraft => self.draft.clear(),
            AddressesCommand::Submit => {
                let current = ctx.state.route.addresses();
                if let Some(path) = submit_address(&current, &self.draft) {
                    log::info!("adding address {}", self.draft);
                    self.draft.clear();
                    ctx.state.navigation.input = InputFocus::None;
                    return Ok(Some(Action::Navigate(path)));
                }
            }
            AddressesCommand::Cancel => {
                return Ok(Some(Action::Focus(InputFocus::None)));
            }
            AddressesCommand::Refresh => {
                log::info!("refreshing balances and price");
                self.refresh_all(ctx);
            }
            AddressesCommand::AddressesChanged => self.fetch_missing(ctx),
            AddressesCommand::PriceResolved { mount, result } => {
                if self.accepts(*mount) {
                    if let Err(reason) = result {
                        log::warn!("price lookup failed: {reason}");
                    }
                    self.portfolio.on_price_response(result.clone());
                }
            }
            AddressesCommand::BalanceResolved {
                mount,
                address,
                result,
            } => {
                if self.accepts(*mount) {
                    match result {
                        Ok(record) => log::debug!(
                            "balance for {} resolved: {} wei across {} txs",
                            short_hex(record.address.as_deref().unwrap_or(address)),
                            record.final_balance,
                            record.n_tx.unwrap_or_default()
                        ),
                        Err(reason) => {
                            log::warn!("balance lookup for {address} failed: {reason}")
                        }
                    }
                    self.portfolio.on_balance_response(address, result.clone());
                }
            }
        }
        Ok(None)
    }

    fn render(&mut self, frame: &mut Frame<'_>, area: Rect, ctx: &AppView<'_>) {
        let addresses = ctx.state.route.addresses();
        let editing = ctx.state.navigation.input == InputFocus::AddressForm;

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Length(3),
                Constraint::Min(3),
            ])
            .split(area);

        let heading = Paragraph::new(Line::from(format!("Addresses: {}", addresses.join(" "))))
            .style(Style::default().add_modifier(Modifier::BOLD));
        frame.render_widget(heading, layout[0]);

        let draft_span = if editing {
            Span::styled(
                format!("{}▌", self.draft),
                Style::default()
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            )
        } else if self.draft.is_empty() {
            Span::styled("press a to type", Style::default().fg(Color::DarkGray))
        } else {
            Span::raw(self.draft.clone())
        };
        let form_style = if editing {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default()
        };
        let form = Paragraph::new(Line::from(vec![
            Span::styled("Ethereum Address: ", Style::default().fg(Color::Gray)),
            draft_span,
        ]))
        .block(
            Block::bordered()
                .title(Line::from("Add address • Enter to submit"))
                .border_style(form_style),
        );
        frame.render_widget(form, layout[1]);

        let in_flight = self.portfolio.in_flight();
        let mut title = format!("Balances • {}", self.price_label());
        if in_flight > 0 {
            title.push_str(&format!(" • {in_flight} request(s) pending"));
        }
        let block = Block::bordered().title(Line::from(title));

        if addresses.is_empty() {
            let empty = Paragraph::new("No addresses yet. Press a to add one.")
                .style(Style::default().fg(Color::Gray))
                .block(block);
            frame.render_widget(empty, layout[2]);
            return;
        }

        let mut rows: Vec<Row> = addresses
            .iter()
            .map(|address| {
                Self::row(
                    self.portfolio.row(address),
                    self.portfolio.is_fetching(address),
                )
            })
            .collect();
        let totals = self.portfolio.totals(&addresses);
        let total_cells = vec![
            "Total".to_string(),
            display_amount(totals.balance),
            self.portfolio.price().map(display_usd).unwrap_or_default(),
            totals.usd.map(display_usd).unwrap_or_else(|| "…".to_string()),
        ];
        rows.push(Row::new(total_cells).style(Style::default().add_modifier(Modifier::BOLD)));

        let header = Row::new(vec!["Address", "Balance (ETH)", "Price (USD)", "Total (USD)"])
            .style(
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            );
        let widths: [Constraint; COLUMNS] = [
            Constraint::Min(24),
            Constraint::Length(20),
            Constraint::Length(14),
            Constraint::Length(16),
        ];
        let table = Table::new(rows, widths)
            .header(header)
            .column_spacing(2)
            .block(block);
        frame.render_widget(table, layout[2]);
    }

    fn tick(&mut self, ctx: &mut AppContext<'_>) -> AppResult<Option<Action>> {
        if self.mount.is_none() {
            return Ok(None);
        }
        let due = match (self.refresh_interval, self.last_refresh) {
            (Some(interval), Some(last)) => last.elapsed() >= interval,
            (Some(_), None) => true,
            (None, _) => false,
        };
        if due {
            log::debug!("refresh interval elapsed");
            self.refresh_all(ctx);
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        app::{AppState, CommandBus, Route},
        config::Config,
    };
    use std::{path::PathBuf, sync::mpsc};
    use tokio::runtime::Runtime;

    const ONE_ETHER: u128 = 1_000_000_000_000_000_000;

    fn view() -> AddressesView {
        let config = Config {
            price_url: "http://127.0.0.1:9/ticker/ethereum/".into(),
            balance_url_template: "http://127.0.0.1:9/addrs/{address}/balance".into(),
            refresh_interval: None,
            data_dir: PathBuf::from("/tmp/ethfolio-test"),
            initial_path: None,
        };
        AddressesView::new(Services::new(&config).expect("client"), None)
    }

    fn state(path: &str) -> AppState {
        AppState {
            route: Route::parse(path),
            ..AppState::default()
        }
    }

    struct Harness {
        runtime: Runtime,
        tx: mpsc::Sender<Message>,
        _rx: mpsc::Receiver<Message>,
    }

    impl Harness {
        fn new() -> Self {
            let (tx, rx) = mpsc::channel();
            Self {
                runtime: Runtime::new().expect("runtime"),
                tx,
                _rx: rx,
            }
        }

        fn ctx<'a>(&self, state: &'a mut AppState) -> AppContext<'a> {
            AppContext {
                state,
                commands: CommandBus::new(self.tx.clone(), self.runtime.handle().clone()),
            }
        }
    }

    #[test]
    fn mount_requests_price_and_each_distinct_address() -> AppResult<()> {
        let harness = Harness::new();
        let mut state = state("/addresses/0xA 0xB 0xA");
        let mut view = view();
        view.init(&mut harness.ctx(&mut state))?;

        assert!(view.mount.is_some());
        assert_eq!(view.portfolio.in_flight(), 3);
        assert!(view.portfolio.is_fetching("0xA"));
        assert!(view.portfolio.is_fetching("0xB"));
        Ok(())
    }

    #[test]
    fn submit_navigates_with_appended_address() -> AppResult<()> {
        let harness = Harness::new();
        let mut state = state("/addresses/0xA 0xB");
        let mut view = view();
        let mut ctx = harness.ctx(&mut state);
        view.init(&mut ctx)?;

        for c in "0xC".chars() {
            view.update(&AddressesCommand::InputChar(c), &mut ctx)?;
        }
        let action = view.update(&AddressesCommand::Submit, &mut ctx)?;
        assert_eq!(
            action,
            Some(Action::Navigate("/addresses/0xA 0xB 0xC".into()))
        );
        assert!(view.draft.is_empty());
        Ok(())
    }

    #[test]
    fn empty_submit_is_a_no_op() -> AppResult<()> {
        let harness = Harness::new();
        let mut state = state("/addresses/0xA");
        let mut view = view();
        let mut ctx = harness.ctx(&mut state);
        assert_eq!(view.update(&AddressesCommand::Submit, &mut ctx)?, None);
        Ok(())
    }

    #[test]
    fn address_change_fetches_only_new_addresses() -> AppResult<()> {
        let harness = Harness::new();
        let mut state = state("/addresses/0xA");
        let mut view = view();
        view.init(&mut harness.ctx(&mut state))?;
        let mount = view.mount.expect("mounted");
        view.update(
            &AddressesCommand::BalanceResolved {
                mount,
                address: "0xA".into(),
                result: Ok(BalanceRecord::from_wei(ONE_ETHER)),
            },
            &mut harness.ctx(&mut state),
        )?;
        assert!(!view.portfolio.is_fetching("0xA"));

        state.route = Route::parse("/addresses/0xA 0xB");
        view.update(
            &AddressesCommand::AddressesChanged,
            &mut harness.ctx(&mut state),
        )?;
        assert!(!view.portfolio.is_fetching("0xA"));
        assert!(view.portfolio.is_fetching("0xB"));
        Ok(())
    }

    #[test]
    fn stale_mount_results_are_ignored() -> AppResult<()> {
        let harness = Harness::new();
        let mut state = state("/addresses/0xA");
        let mut view = view();
        view.init(&mut harness.ctx(&mut state))?;
        let first = view.mount.expect("mounted");

        view.teardown(&mut harness.ctx(&mut state))?;
        view.init(&mut harness.ctx(&mut state))?;
        assert_ne!(view.mount, Some(first));

        view.update(
            &AddressesCommand::BalanceResolved {
                mount: first,
                address: "0xA".into(),
                result: Ok(BalanceRecord::from_wei(ONE_ETHER)),
            },
            &mut harness.ctx(&mut state),
        )?;
        view.update(
            &AddressesCommand::PriceResolved {
                mount: first,
                result: Ok(Some(1500.0)),
            },
            &mut harness.ctx(&mut state),
        )?;
        assert!(view.portfolio.balance("0xA").is_none());
        assert!(view.portfolio.price().is_none());
        Ok(())
    }

    #[test]
    fn results_after_unmount_are_ignored() -> AppResult<()> {
        let harness = Harness::new();
        let mut state = state("/addresses/0xA");
        let mut view = view();
        view.init(&mut harness.ctx(&mut state))?;
        let mount = view.mount.expect("mounted");
        view.teardown(&mut harness.ctx(&mut state))?;

        view.update(
            &AddressesCommand::PriceResolved {
                mount,
                result: Ok(Some(1500.0)),
            },
            &mut harness.ctx(&mut state),
        )?;
        assert!(view.portfolio.price().is_none());
        assert!(view.tasks.is_empty());
        Ok(())
    }

    #[test]
    fn current_mount_results_update_totals() -> AppResult<()> {
        let harness = Harness::new();
        let mut state = state("/addresses/0xA 0xB");
        let mut view = view();
        view.init(&mut harness.ctx(&mut state))?;
        let mount = view.mount.expect("mounted");

        view.update(
            &AddressesCommand::BalanceResolved {
                mount,
                address: "0xA".into(),
                result: Ok(BalanceRecord::from_wei(ONE_ETHER)),
            },
            &mut harness.ctx(&mut state),
        )?;
        view.update(
            &AddressesCommand::PriceResolved {
                mount,
                result: Ok(Some(1500.0)),
            },
            &mut harness.ctx(&mut state),
        )?;

        let totals = view.portfolio.totals(&state.route.addresses());
        assert_eq!(totals.balance, 1.0);
        assert_eq!(totals.usd, Some(1500.0));
        Ok(())
    }
}
