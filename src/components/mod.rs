use crate::app::{Action, AppContext, AppResult, AppView};
use ratatui::Frame;
use ratatui::layout::Rect;

/// Trait implemented by all UI components (header, views, keymap bar).
pub trait Component {
    /// Component-local action type. Returned actions will be lifted into the global [`Action`].
    type Command;

    /// Perform setup logic. Routed views run this each time they are mounted.
    fn init(&mut self, ctx: &mut AppContext<'_>) -> AppResult<()>;

    /// Release whatever [`Component::init`] acquired when a routed view is unmounted.
    fn teardown(&mut self, _ctx: &mut AppContext<'_>) -> AppResult<()> {
        Ok(())
    }

    /// Handle a component-local command and optionally bubble up a global action.
    fn update(
        &mut self,
        command: &Self::Command,
        ctx: &mut AppContext<'_>,
    ) -> AppResult<Option<Action>>;

    /// Render the component into the provided [`Rect`].
    fn render(&mut self, frame: &mut Frame<'_>, area: Rect, ctx: &AppView<'_>);

    /// Called on every tick to perform periodic work (e.g., polling).
    fn tick(&mut self, ctx: &mut AppContext<'_>) -> AppResult<Option<Action>>;
}
