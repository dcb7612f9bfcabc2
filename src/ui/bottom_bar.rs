use crate::{
    app::{Action, AppContext, AppResult, AppView, InputFocus},
    components::Component,
};
use ratatui::{
    Frame,
    layout::Rect,
    style::{Modifier, Style},
    text::Line,
    widgets::{Block, Paragraph},
};

/// Key bindings for whatever currently has input focus.
#[derive(Debug, Default)]
pub struct BottomBar;

impl BottomBar {
    fn keymap(ctx: &AppView<'_>) -> &'static str {
        match ctx.state.navigation.input {
            InputFocus::RouteBar => "Enter Go • Esc Cancel • Ctrl+U Clear",
            InputFocus::AddressForm => "Enter Add address • Esc Done • Ctrl+U Clear",
            InputFocus::None if ctx.state.route.is_addresses() => {
                "q Quit • / Edit path • 1 Home • a Add address • r Refresh"
            }
            InputFocus::None => "q Quit • / Edit path • 2 Addresses • a Add address",
        }
    }
}

impl Component for BottomBar {
    type Command = ();

    fn init(&mut self, _ctx: &mut AppContext<'_>) -> AppResult<()> {
        Ok(())
    }

    fn update(
        &mut self,
        _command: &Self::Command,
        _ctx: &mut AppContext<'_>,
    ) -> AppResult<Option<Action>> {
        Ok(None)
    }

    fn render(&mut self, frame: &mut Frame<'_>, area: Rect, ctx: &AppView<'_>) {
        let widget = Paragraph::new(Line::from(Self::keymap(ctx))).block(
            Block::bordered()
                .title(Line::from("Keymap").style(Style::default().add_modifier(Modifier::BOLD))),
        );
        frame.render_widget(widget, area);
    }

    fn tick(&mut self, _ctx: &mut AppContext<'_>) -> AppResult<Option<Action>> {
        Ok(None)
    }
}
