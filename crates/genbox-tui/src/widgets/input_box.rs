//! InputBox — wraps tui-input for the prompt / message / lyrics fields.

use ratatui::crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use tui_input::{backend::crossterm::EventHandler, Input};

use crate::theme::{
    style_focused_border, style_unfocused_border, C_INPUT_BG, C_INPUT_FG, C_MUTED, C_PRIMARY,
    C_SECONDARY,
};

pub enum InputEvent {
    Changed,
    Confirmed,
    Cancelled,
}

pub struct InputBox {
    input: Input,
    title: &'static str,
    placeholder: &'static str,
    pub active: bool,
}

impl InputBox {
    pub fn new(title: &'static str, placeholder: &'static str) -> Self {
        Self {
            input: Input::default(),
            title,
            placeholder,
            active: false,
        }
    }

    pub fn activate(&mut self) {
        self.active = true;
    }

    pub fn deactivate(&mut self) {
        self.active = false;
    }

    pub fn text(&self) -> &str {
        self.input.value()
    }

    pub fn is_empty(&self) -> bool {
        self.input.value().trim().is_empty()
    }

    /// Handle a key while active.  Enter confirms, Esc leaves edit mode,
    /// everything else feeds the input.
    pub fn handle_key(&mut self, key: KeyEvent) -> InputEvent {
        match key.code {
            KeyCode::Esc => {
                self.deactivate();
                InputEvent::Cancelled
            }
            KeyCode::Enter => InputEvent::Confirmed,
            _ => {
                self.input
                    .handle_event(&ratatui::crossterm::event::Event::Key(key));
                InputEvent::Changed
            }
        }
    }

    /// Render as a one-line bordered field.  Shows the cursor while active.
    pub fn draw(&self, frame: &mut Frame, area: Rect, highlighted: bool) {
        let border = if self.active {
            style_focused_border()
        } else {
            style_unfocused_border()
        };
        let title_style = if highlighted {
            Style::default().fg(C_SECONDARY)
        } else {
            Style::default().fg(C_MUTED)
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(border)
            .title(Span::styled(self.title, title_style));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let width = inner.width.saturating_sub(1) as usize;
        let scroll = self.input.visual_scroll(width);
        let value = self.input.value();
        let display = if value.is_empty() && !self.active {
            Span::styled(self.placeholder, Style::default().fg(C_MUTED))
        } else {
            let fg = if self.active { C_INPUT_FG } else { C_PRIMARY };
            Span::styled(value[scroll..].to_string(), Style::default().fg(fg))
        };
        let mut paragraph = Paragraph::new(Line::from(display));
        if self.active {
            paragraph = paragraph.style(Style::default().bg(C_INPUT_BG));
        }
        frame.render_widget(paragraph, inner);

        if self.active {
            let cursor_x = inner.x + (self.input.visual_cursor().saturating_sub(scroll)) as u16;
            frame.set_cursor_position((cursor_x.min(inner.x + inner.width.saturating_sub(1)), inner.y));
        }
    }
}
