//! Chat panel — model selector, message input, and a short transcript.
//!
//! Chat is the one synchronous flow: no job, no polling, the reply text is
//! rendered as soon as the backend answers.

use ratatui::crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Paragraph, Wrap},
    Frame,
};

use genbox_proto::catalog::MediaKind;

use crate::action::{Action, ComponentId};
use crate::app_state::AppState;
use crate::component::Component;
use crate::components::gen_panel::draw_model_line;
use crate::theme::{style_muted, style_secondary, C_PENDING, C_PRIMARY};
use crate::widgets::input_box::{InputBox, InputEvent};
use crate::widgets::pane_chrome::pane_chrome;

pub struct ChatPanel {
    message: InputBox,
}

impl ChatPanel {
    pub fn new() -> Self {
        Self {
            message: InputBox::new("message", "ask something…"),
        }
    }

    fn submit(&self, state: &AppState) -> Vec<Action> {
        let Some(model) = state.selected_model(MediaKind::Chat) else {
            return Vec::new();
        };
        let message = self.message.text().trim().to_string();
        if message.is_empty() {
            return Vec::new();
        }
        vec![Action::SubmitChat {
            model: model.id.clone(),
            message,
        }]
    }
}

impl Component for ChatPanel {
    fn id(&self) -> ComponentId {
        ComponentId::ChatPanel
    }

    fn editing(&self) -> bool {
        self.message.active
    }

    fn handle_key(&mut self, key: KeyEvent, state: &AppState) -> Vec<Action> {
        if self.message.active {
            return match self.message.handle_key(key) {
                InputEvent::Confirmed => self.submit(state),
                _ => Vec::new(),
            };
        }

        match key.code {
            KeyCode::Char('i') | KeyCode::Char('e') => {
                self.message.activate();
                Vec::new()
            }
            KeyCode::Left | KeyCode::Char('h') => vec![Action::CycleModel {
                kind: MediaKind::Chat,
                step: -1,
            }],
            KeyCode::Right | KeyCode::Char('l') => vec![Action::CycleModel {
                kind: MediaKind::Chat,
                step: 1,
            }],
            KeyCode::Enter => self.submit(state),
            _ => Vec::new(),
        }
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, state: &AppState) {
        let block = pane_chrome("Chat", Some('1'), true, None);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Length(3),
                Constraint::Min(0),
            ])
            .split(inner);

        draw_model_line(frame, rows[0], state, MediaKind::Chat);
        self.message.draw(frame, rows[1], true);

        let mut lines: Vec<Line> = Vec::new();
        for exchange in &state.chat_history {
            lines.push(Line::from(Span::styled(
                format!("❯ {}", exchange.message),
                style_secondary(),
            )));
            for reply_line in exchange.reply.lines() {
                lines.push(Line::from(Span::styled(
                    reply_line.to_string(),
                    Style::default().fg(C_PRIMARY),
                )));
            }
            lines.push(Line::from(""));
        }
        if state.chat_busy {
            lines.push(Line::from(Span::styled("…", Style::default().fg(C_PENDING))));
        }
        if lines.is_empty() {
            lines.push(Line::from(Span::styled(
                "No messages yet. Write one and press Enter.",
                style_muted(),
            )));
        }

        // Keep the tail visible; older exchanges scroll off the top.
        let height = rows[2].height as usize;
        let skip = lines.len().saturating_sub(height);
        let visible: Vec<Line> = lines.into_iter().skip(skip).collect();
        frame.render_widget(Paragraph::new(visible).wrap(Wrap { trim: false }), rows[2]);
    }
}
