use crate::{
    components::Component,
    config::Config,
    storage::Storage,
    ui::{
        addresses::{AddressesCommand, AddressesView},
        bottom_bar::BottomBar,
        header::{Header, HeaderCommand},
        home::{Home, HomeCommand},
    },
};
pub type AppResult<T> = color_eyre::Result<T>;
use color_eyre::eyre::WrapErr;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    DefaultTerminal, Frame,
    layout::{Constraint, Direction, Layout},
};
use std::{
    sync::{
        atomic::{AtomicU64, Ordering},
        mpsc,
    },
    time::Duration,
};
use tokio::{
    runtime::{Handle, Runtime},
    task::AbortHandle,
};

pub mod address_list;
pub mod balances;
pub mod fetch;
pub mod portfolio;
pub mod prices;
pub mod router;

pub use balances::BalanceRecord;
pub use fetch::Services;
pub use navigation::InputFocus;
pub use router::Route;

const EVENT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Central application type: owns the route, the views and the async runtime.
pub struct App {
    running: bool,
    pub state: AppState,
    pub storage: Storage,
    header: Header,
    home: Home,
    addresses: AddressesView,
    bottom_bar: BottomBar,
    // Dropping the runtime cancels in-flight lookups.
    _runtime: Runtime,
    runtime_handle: Handle,
    message_rx: mpsc::Receiver<Message>,
    message_tx: mpsc::Sender<Message>,
}

impl App {
    pub fn new(config: Config) -> AppResult<Self> {
        let storage = Storage::open(&config.data_dir)?;
        log::debug!("storage opened at {}", storage.root().display());
        let services = Services::new(&config).wrap_err("failed to build HTTP client")?;
        let runtime = Runtime::new()?;
        let runtime_handle = runtime.handle().clone();
        let (message_tx, message_rx) = mpsc::channel();

        let initial_path = match config.initial_path.clone() {
            Some(path) => path,
            None => storage
                .settings()
                .last_path()?
                .unwrap_or_else(|| Route::Home.path()),
        };

        let mut app = Self {
            running: false,
            state: AppState::default(),
            storage,
            header: Header::default(),
            home: Home,
            addresses: AddressesView::new(services, config.refresh_interval),
            bottom_bar: BottomBar,
            _runtime: runtime,
            runtime_handle,
            message_rx,
            message_tx,
        };

        {
            let commands = app.command_bus();
            let mut ctx = AppContext {
                state: &mut app.state,
                commands,
            };
            app.header.init(&mut ctx)?;
            app.home.init(&mut ctx)?;
            app.bottom_bar.init(&mut ctx)?;
        }
        app.navigate(&initial_path)?;
        Ok(app)
    }

    /// Runs the UI loop. Cleanup runs even when the loop fails.
    pub fn run(mut self, mut terminal: DefaultTerminal) -> AppResult<()> {
        self.running = true;
        let outcome = self.event_loop(&mut terminal);
        if let Err(err) = &outcome {
            log::error!("ui loop failed: {err}");
        }
        let shutdown = self.shutdown();
        outcome.and(shutdown)
    }

    fn event_loop(&mut self, terminal: &mut DefaultTerminal) -> AppResult<()> {
        while self.running {
            self.tick()?;
            terminal.draw(|frame| self.render(frame))?;
            self.handle_events()?;
        }
        Ok(())
    }

    /// Unmounts the addresses view and flushes storage.
    fn shutdown(&mut self) -> AppResult<()> {
        self.running = false;
        if self.addresses.is_mounted() {
            let commands = self.command_bus();
            let mut ctx = AppContext {
                state: &mut self.state,
                commands,
            };
            self.addresses.teardown(&mut ctx)?;
        }
        self.storage.persist()?;
        log::info!("ethfolio exiting");
        Ok(())
    }

    fn command_bus(&self) -> CommandBus {
        CommandBus::new(self.message_tx.clone(), self.runtime_handle.clone())
    }

    fn render(&mut self, frame: &mut Frame<'_>) {
        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(4),
                Constraint::Min(1),
                Constraint::Length(3),
            ])
            .split(frame.area());

        let view = AppView { state: &self.state };

        self.header.render(frame, layout[0], &view);
        match self.state.route {
            Route::Home => self.home.render(frame, layout[1], &view),
            Route::Addresses(_) => self.addresses.render(frame, layout[1], &view),
        }
        self.bottom_bar.render(frame, layout[2], &view);
    }

    fn handle_events(&mut self) -> AppResult<()> {
        if !event::poll(EVENT_POLL_INTERVAL)? {
            return Ok(());
        }
        match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => self.on_key_event(key)?,
            Event::Paste(text) => self.on_paste(text)?,
            Event::Mouse(_) | Event::Resize(_, _) => {}
            _ => {}
        }
        Ok(())
    }

    fn on_key_event(&mut self, key: KeyEvent) -> AppResult<()> {
        if key.modifiers.contains(KeyModifiers::CONTROL)
            && matches!(key.code, KeyCode::Char('c') | KeyCode::Char('C'))
        {
            return self.dispatch(Action::Quit);
        }

        match self.state.navigation.input {
            InputFocus::RouteBar => {
                if let Some(command) = Header::command_from_key(key) {
                    self.header_command(command)?;
                }
                return Ok(());
            }
            InputFocus::AddressForm => {
                if let Some(command) = AddressesView::command_from_key(key) {
                    self.addresses_command(command)?;
                }
                return Ok(());
            }
            InputFocus::None => {}
        }

        match (key.modifiers, key.code) {
            (_, KeyCode::Esc | KeyCode::Char('q')) => self.dispatch(Action::Quit)?,
            (KeyModifiers::NONE, KeyCode::Char('/')) => {
                self.header_command(HeaderCommand::Activate)?;
            }
            (KeyModifiers::NONE, KeyCode::Char('1')) => {
                self.dispatch(Action::Navigate(Route::Home.path()))?;
            }
            (KeyModifiers::NONE, KeyCode::Char('2')) => {
                if !self.state.route.is_addresses() {
                    self.home_command(HomeCommand::OpenAddresses)?;
                }
            }
            (KeyModifiers::NONE, KeyCode::Char('a')) => {
                if !self.state.route.is_addresses() {
                    self.home_command(HomeCommand::OpenAddresses)?;
                }
                self.addresses_command(AddressesCommand::FocusForm)?;
            }
            (KeyModifiers::NONE, KeyCode::Char('r')) if self.state.route.is_addresses() => {
                self.addresses_command(AddressesCommand::Refresh)?;
                self.header_command(HeaderCommand::ShowStatus("Refreshing balances…".into()))?;
            }
            _ => {}
        }
        Ok(())
    }

    fn on_paste(&mut self, text: String) -> AppResult<()> {
        match self.state.navigation.input {
            InputFocus::RouteBar => self.header_command(HeaderCommand::InsertText(text)),
            InputFocus::AddressForm => self.addresses_command(AddressesCommand::InsertText(text)),
            InputFocus::None => Ok(()),
        }
    }

    fn dispatch(&mut self, action: Action) -> AppResult<()> {
        match action {
            Action::Quit => self.running = false,
            Action::Navigate(path) => self.navigate(&path)?,
            Action::Focus(focus) => self.state.navigation.input = focus,
        }
        Ok(())
    }

    /// The `route(path)` effect: swaps the route, mounting or unmounting the addresses view.
    fn navigate(&mut self, path: &str) -> AppResult<()> {
        let next = Route::parse(path);
        let previous = std::mem::replace(&mut self.state.route, next.clone());
        log::info!("navigating to {}", next.path());
        self.storage.settings().set_last_path(&next.path())?;

        let commands = self.command_bus();
        let mut ctx = AppContext {
            state: &mut self.state,
            commands,
        };
        match (previous.is_addresses(), next.is_addresses()) {
            (true, true) => {
                if previous != next {
                    self.addresses
                        .update(&AddressesCommand::AddressesChanged, &mut ctx)?;
                }
            }
            (true, false) => self.addresses.teardown(&mut ctx)?,
            (false, true) => self.addresses.init(&mut ctx)?,
            (false, false) => {}
        }
        self.header.update(&HeaderCommand::RouteChanged, &mut ctx)?;
        Ok(())
    }

    fn header_command(&mut self, command: HeaderCommand) -> AppResult<()> {
        let commands = self.command_bus();
        let mut ctx = AppContext {
            state: &mut self.state,
            commands,
        };
        if let Some(action) = self.header.update(&command, &mut ctx)? {
            self.dispatch(action)?;
        }
        Ok(())
    }

    fn home_command(&mut self, command: HomeCommand) -> AppResult<()> {
        let commands = self.command_bus();
        let mut ctx = AppContext {
            state: &mut self.state,
            commands,
        };
        if let Some(action) = self.home.update(&command, &mut ctx)? {
            self.dispatch(action)?;
        }
        Ok(())
    }

    fn addresses_command(&mut self, command: AddressesCommand) -> AppResult<()> {
        let commands = self.command_bus();
        let mut ctx = AppContext {
            state: &mut self.state,
            commands,
        };
        if let Some(action) = self.addresses.update(&command, &mut ctx)? {
            self.dispatch(action)?;
        }
        Ok(())
    }

    fn tick(&mut self) -> AppResult<()> {
        {
            let commands = self.command_bus();
            let mut ctx = AppContext {
                state: &mut self.state,
                commands,
            };
            if let Some(action) = self.header.tick(&mut ctx)? {
                self.dispatch(action)?;
            }
        }
        if self.state.route.is_addresses() {
            let commands = self.command_bus();
            let mut ctx = AppContext {
                state: &mut self.state,
                commands,
            };
            if let Some(action) = self.addresses.tick(&mut ctx)? {
                self.dispatch(action)?;
            }
        }
        self.drain_messages()
    }

    fn drain_messages(&mut self) -> AppResult<()> {
        while let Ok(message) = self.message_rx.try_recv() {
            let command = match message {
                Message::PriceFetched { mount, result } => {
                    AddressesCommand::PriceResolved { mount, result }
                }
                Message::BalanceFetched {
                    mount,
                    address,
                    result,
                } => AddressesCommand::BalanceResolved {
                    mount,
                    address,
                    result,
                },
            };
            self.addresses_command(command)?;
        }
        Ok(())
    }
}

/// State shared across components.
#[derive(Debug, Default)]
pub struct AppState {
    pub route: Route,
    pub navigation: NavigationState,
}

#[derive(Debug, Default)]
pub struct NavigationState {
    pub input: InputFocus,
}

/// Mutable context passed to components while handling logic.
pub struct AppContext<'a> {
    pub state: &'a mut AppState,
    pub commands: CommandBus,
}

/// Read-only context used during rendering.
pub struct AppView<'a> {
    pub state: &'a AppState,
}

#[derive(Clone)]
pub struct CommandBus {
    sender: mpsc::Sender<Message>,
    handle: Handle,
}

impl CommandBus {
    pub fn new(sender: mpsc::Sender<Message>, handle: Handle) -> Self {
        Self { sender, handle }
    }

    /// Runs `task` on the runtime and posts its message back to the UI loop.
    pub fn spawn_async<F, Fut>(&self, task: F) -> AbortHandle
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: std::future::Future<Output = Message> + Send + 'static,
    {
        let sender = self.sender.clone();
        self.handle
            .spawn(async move {
                let message = task().await;
                let _ = sender.send(message);
            })
            .abort_handle()
    }
}

/// Identifies one mounted lifetime of the addresses view. Results carry the
/// token they were requested under and are dropped once it is no longer current.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MountToken(u64);

impl MountToken {
    pub fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

#[derive(Debug, Clone)]
pub enum Message {
    PriceFetched {
        mount: MountToken,
        result: Result<Option<f64>, String>,
    },
    BalanceFetched {
        mount: MountToken,
        address: String,
        result: Result<BalanceRecord, String>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Quit,
    Navigate(String),
    Focus(InputFocus),
}

mod navigation {
    /// Which text input, if any, receives key presses.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum InputFocus {
        None,
        RouteBar,
        AddressForm,
    }

    impl Default for InputFocus {
        fn default() -> Self {
            Self::None
        }
    }
}
