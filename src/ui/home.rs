use crate::{
    app::{Action, AppContext, AppResult, AppView, Route},
    components::Component,
};
use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::Line,
    widgets::{Block, Paragraph, Wrap},
};

/// Landing view for `/`.
#[derive(Debug, Default)]
pub struct Home;

#[derive(Debug)]
pub enum HomeCommand {
    OpenAddresses,
}

impl Component for Home {
    type Command = HomeCommand;

    fn init(&mut self, _ctx: &mut AppContext<'_>) -> AppResult<()> {
        Ok(())
    }

    fn update(
        &mut self,
        command: &Self::Command,
        _ctx: &mut AppContext<'_>,
    ) -> AppResult<Option<Action>> {
        match command {
            HomeCommand::OpenAddresses => Ok(Some(Action::Navigate(Route::Addresses(None).path()))),
        }
    }

    fn render(&mut self, frame: &mut Frame<'_>, area: Rect, _ctx: &AppView<'_>) {
        let lines = vec![
            Line::from("Home").style(Style::default().add_modifier(Modifier::BOLD)),
            Line::from(""),
            Line::from("Track the ether balance and USD value of any set of Ethereum addresses."),
            Line::from("The address list lives in the path, so /addresses/0xabc 0xdef reopens it."),
            Line::from(""),
            Line::from("Press 2 to open the addresses view or a to add an address.")
                .style(Style::default().fg(Color::Gray)),
        ];
        let widget = Paragraph::new(lines)
            .wrap(Wrap { trim: true })
            .block(Block::bordered().title(Line::from("Home")));
        frame.render_widget(widget, area);
    }

    fn tick(&mut self, _ctx: &mut AppContext<'_>) -> AppResult<Option<Action>> {
        Ok(None)
    }
}
