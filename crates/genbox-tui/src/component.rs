//! Component trait — the interface every tab panel implements.
//!
//! Design principles:
//! - Panels are self-contained: they own their inputs and render themselves.
//! - Panels receive `AppState` (read-only) for data they don't own.
//! - Panels produce `Vec<Action>` — they never mutate shared state directly.
//! - The App event loop dispatches those actions.

use ratatui::crossterm::event::KeyEvent;
use ratatui::{layout::Rect, Frame};

use crate::action::{Action, ComponentId};
use crate::app_state::AppState;

pub trait Component {
    /// Which panel is this?
    fn id(&self) -> ComponentId;

    /// Handle a key event.  Only called for the visible panel.
    fn handle_key(&mut self, key: KeyEvent, state: &AppState) -> Vec<Action>;

    /// True while the panel is capturing text — single-letter global
    /// shortcuts are suspended then.
    fn editing(&self) -> bool {
        false
    }

    /// Render the panel into `area`.
    fn draw(&mut self, frame: &mut Frame, area: Rect, state: &AppState);
}
