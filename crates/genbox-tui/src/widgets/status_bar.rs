//! Status bar — bottom line with input mode and keybindings.

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::action::Tab;
use crate::theme::{C_INPUT_FG, C_MUTED, C_SECONDARY, C_SEPARATOR};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputMode {
    Nav,
    Edit,
}

impl InputMode {
    pub fn label(self) -> &'static str {
        match self {
            Self::Nav => "NAV",
            Self::Edit => "EDIT",
        }
    }

    pub fn color(self) -> ratatui::style::Color {
        match self {
            Self::Nav => C_SECONDARY,
            Self::Edit => C_INPUT_FG,
        }
    }
}

/// Draw a horizontal separator line.
pub fn draw_separator(frame: &mut Frame, area: Rect) {
    let line = Line::from(Span::styled(
        "─".repeat(area.width as usize),
        Style::default().fg(C_SEPARATOR),
    ));
    frame.render_widget(Paragraph::new(line), area);
}

/// Draw the keybindings footer bar (one row).
pub fn draw_keys_bar(frame: &mut Frame, area: Rect, mode: InputMode, tab: Tab) {
    let keys = match mode {
        InputMode::Edit => " type to edit  Enter submit  Esc done",
        InputMode::Nav => match tab {
            Tab::Chat => " Enter send  i edit  ←→ model  1-4/Tab tabs  q quit",
            Tab::Image | Tab::Video => {
                " Enter submit  i edit  ←→ model  y copy url  1-4/Tab tabs  q quit"
            }
            Tab::Music => {
                " Enter submit  i edit  ↑↓ field  ←→ model  y copy url  1-4/Tab tabs  q quit"
            }
        },
    };

    let line = Line::from(vec![
        Span::styled(
            format!(" {} ", mode.label()),
            Style::default()
                .fg(mode.color())
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(keys, Style::default().fg(C_MUTED)),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}
