use crate::{
    app::{Action, AppContext, AppResult, AppView, InputFocus, Route},
    components::Component,
};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Paragraph},
};
use std::time::{Duration, Instant};

const STATUS_TTL: Duration = Duration::from_secs(4);

/// Title, current route path and the editable route bar.
#[derive(Debug)]
pub struct Header {
    title: String,
    route_value: String,
    status: Option<(String, Instant)>,
}

impl Default for Header {
    fn default() -> Self {
        Self {
            title: "ethfolio".to_string(),
            route_value: String::new(),
            status: None,
        }
    }
}

#[derive(Debug, Clone)]
pub enum HeaderCommand {
    Activate,
    InputChar(char),
    InsertText(String),
    Backspace,
    ClearInput,
    Submit,
    Cancel,
    RouteChanged,
    ShowStatus(String),
}

impl Header {
    pub fn command_from_key(event: KeyEvent) -> Option<HeaderCommand> {
        match (event.modifiers, event.code) {
            (_, KeyCode::Esc) => Some(HeaderCommand::Cancel),
            (_, KeyCode::Enter) => Some(HeaderCommand::Submit),
            (_, KeyCode::Backspace) => Some(HeaderCommand::Backspace),
            (KeyModifiers::CONTROL, KeyCode::Char('u')) => Some(HeaderCommand::ClearInput),
            (modifiers, KeyCode::Char(c)) if !modifiers.contains(KeyModifiers::CONTROL) => {
                Some(HeaderCommand::InputChar(c))
            }
            _ => None,
        }
    }

    fn set_status(&mut self, message: impl Into<String>) {
        self.status = Some((message.into(), Instant::now()));
    }

    fn status_line(&self) -> Option<Line<'_>> {
        self.status
            .as_ref()
            .map(|(status, _)| Line::from(status.clone()).style(Style::default().fg(Color::Gray)))
    }

    fn nav_span(label: &'static str, active: bool) -> Span<'static> {
        if active {
            Span::styled(
                label,
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
            )
        } else {
            Span::styled(label, Style::default().fg(Color::Gray))
        }
    }
}

impl Component for Header {
    type Command = HeaderCommand;

    fn init(&mut self, ctx: &mut AppContext<'_>) -> AppResult<()> {
        self.route_value = ctx.state.route.path();
        Ok(())
    }

    fn update(
        &mut self,
        command: &Self::Command,
        ctx: &mut AppContext<'_>,
    ) -> AppResult<Option<Action>> {
        match command {
            HeaderCommand::Activate => {
                self.route_value = ctx.state.route.path();
                self.set_status("Edit the path and press Enter");
                return Ok(Some(Action::Focus(InputFocus::RouteBar)));
            }
            HeaderCommand::InputChar(c) => self.route_value.push(*c),
            HeaderCommand::InsertText(text) => {
                let cleaned: String = text
                    .chars()
                    .filter(|ch| !matches!(ch, '\r' | '\n'))
                    .collect();
                self.route_value.push_str(&cleaned);
            }
            HeaderCommand::Backspace => {
                self.route_value.pop();
            }
            HeaderCommand::ClearInput => self.route_value.clear(),
            HeaderCommand::Submit => {
                let path = self.route_value.trim_start().to_string();
                if path.is_empty() {
                    self.set_status("Enter a path such as /addresses/0x…");
                    return Ok(None);
                }
                ctx.state.navigation.input = InputFocus::None;
                return Ok(Some(Action::Navigate(path)));
            }
            HeaderCommand::Cancel => {
                self.route_value = ctx.state.route.path();
                self.set_status("Navigation cancelled");
                return Ok(Some(Action::Focus(InputFocus::None)));
            }
            HeaderCommand::RouteChanged => {
                self.route_value = ctx.state.route.path();
                let count = ctx.state.route.addresses().len();
                match &ctx.state.route {
                    Route::Home => self.set_status("Opened home"),
                    Route::Addresses(_) => self.set_status(format!(
                        "Tracking {count} address{}",
                        if count == 1 { "" } else { "es" }
                    )),
                }
            }
            HeaderCommand::ShowStatus(message) => self.set_status(message.clone()),
        }
        Ok(None)
    }

    fn render(&mut self, frame: &mut Frame<'_>, area: Rect, ctx: &AppView<'_>) {
        let editing = ctx.state.navigation.input == InputFocus::RouteBar;
        let on_addresses = ctx.state.route.is_addresses();
        let title = Line::from(vec![
            Span::styled(
                format!("{} ", self.title),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Self::nav_span("[1] Home", !on_addresses),
            Span::raw(" "),
            Self::nav_span("[2] Addresses", on_addresses),
        ]);
        let border_style = if editing {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default()
        };

        let mut lines = Vec::new();
        if editing {
            lines.push(Line::from(Span::styled(
                format!("› {}_", self.route_value),
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            )));
        } else {
            lines.push(Line::from(vec![
                Span::styled("Path: ", Style::default().fg(Color::Gray)),
                Span::raw(ctx.state.route.path()),
            ]));
        }
        match self.status_line() {
            Some(status) => lines.push(status),
            None => lines.push(
                Line::from("Press / to edit the path").style(Style::default().fg(Color::DarkGray)),
            ),
        }

        let widget = Paragraph::new(lines).block(
            Block::bordered()
                .title(title)
                .border_style(border_style),
        );
        frame.render_widget(widget, area);
    }

    fn tick(&mut self, _ctx: &mut AppContext<'_>) -> AppResult<Option<Action>> {
        let expired = self
            .status
            .as_ref()
            .is_some_and(|(_, shown_at)| shown_at.elapsed() >= STATUS_TTL);
        if expired {
            self.status = None;
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::{AppState, CommandBus};
    use std::sync::mpsc;
    use tokio::runtime::Runtime;

    fn with_ctx<T>(state: &mut AppState, f: impl FnOnce(&mut AppContext<'_>) -> T) -> T {
        let runtime = Runtime::new().expect("runtime");
        let (tx, _rx) = mpsc::channel();
        let mut ctx = AppContext {
            state,
            commands: CommandBus::new(tx, runtime.handle().clone()),
        };
        f(&mut ctx)
    }

    #[test]
    fn submit_navigates_to_typed_path() -> AppResult<()> {
        let mut header = Header::default();
        let mut state = AppState::default();
        with_ctx(&mut state, |ctx| {
            assert_eq!(
                header.update(&HeaderCommand::Activate, ctx)?,
                Some(Action::Focus(InputFocus::RouteBar))
            );
            ctx.state.navigation.input = InputFocus::RouteBar;
            header.update(&HeaderCommand::ClearInput, ctx)?;
            header.update(&HeaderCommand::InsertText("/addresses/0xA\n".into()), ctx)?;
            header.update(&HeaderCommand::InputChar(' '), ctx)?;
            header.update(&HeaderCommand::InputChar('0'), ctx)?;
            header.update(&HeaderCommand::InputChar('x'), ctx)?;
            header.update(&HeaderCommand::InputChar('B'), ctx)?;

            let action = header.update(&HeaderCommand::Submit, ctx)?;
            assert_eq!(action, Some(Action::Navigate("/addresses/0xA 0xB".into())));
            assert_eq!(ctx.state.navigation.input, InputFocus::None);
            Ok(())
        })
    }

    #[test]
    fn empty_path_is_not_submitted() -> AppResult<()> {
        let mut header = Header::default();
        let mut state = AppState::default();
        with_ctx(&mut state, |ctx| {
            header.update(&HeaderCommand::ClearInput, ctx)?;
            assert_eq!(header.update(&HeaderCommand::Submit, ctx)?, None);
            Ok(())
        })
    }

    #[test]
    fn cancel_restores_current_path() -> AppResult<()> {
        let mut header = Header::default();
        let mut state = AppState {
            route: Route::Addresses(Some("0xA".into())),
            ..AppState::default()
        };
        with_ctx(&mut state, |ctx| {
            header.update(&HeaderCommand::Activate, ctx)?;
            header.update(&HeaderCommand::InputChar('z'), ctx)?;
            let action = header.update(&HeaderCommand::Cancel, ctx)?;
            assert_eq!(action, Some(Action::Focus(InputFocus::None)));
            assert_eq!(header.route_value, "/addresses/0xA");
            Ok(())
        })
    }
}
