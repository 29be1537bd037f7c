//! Music panel — two-field variant of the generation panel: lyrics plus a
//! style tag.  Lyrics are required, style may be empty but is always sent.

use ratatui::crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    widgets::{Paragraph, Wrap},
    Frame,
};

use genbox_proto::catalog::MediaKind;
use genbox_proto::job::GenerationRequest;

use crate::action::{Action, ComponentId};
use crate::app_state::AppState;
use crate::component::Component;
use crate::components::gen_panel::{draw_model_line, job_badge, job_output_lines};
use crate::widgets::input_box::{InputBox, InputEvent};
use crate::widgets::pane_chrome::pane_chrome;

#[derive(Debug, Clone, Copy, PartialEq)]
enum MusicField {
    Lyrics,
    Style,
}

pub struct MusicPanel {
    lyrics: InputBox,
    style: InputBox,
    field: MusicField,
}

impl MusicPanel {
    pub fn new() -> Self {
        Self {
            lyrics: InputBox::new("lyrics", "write some lyrics…"),
            style: InputBox::new("style", "genre / mood, optional"),
            field: MusicField::Lyrics,
        }
    }

    fn active_input(&mut self) -> &mut InputBox {
        match self.field {
            MusicField::Lyrics => &mut self.lyrics,
            MusicField::Style => &mut self.style,
        }
    }

    fn submit(&self, state: &AppState) -> Vec<Action> {
        let Some(model) = state.selected_model(MediaKind::Music) else {
            return Vec::new();
        };
        let lyrics = self.lyrics.text().trim().to_string();
        if lyrics.is_empty() {
            return Vec::new();
        }
        vec![Action::Submit {
            kind: MediaKind::Music,
            request: GenerationRequest::Song {
                model: model.id.clone(),
                lyrics,
                style: self.style.text().trim().to_string(),
            },
        }]
    }
}

impl Component for MusicPanel {
    fn id(&self) -> ComponentId {
        ComponentId::MusicPanel
    }

    fn editing(&self) -> bool {
        self.lyrics.active || self.style.active
    }

    fn handle_key(&mut self, key: KeyEvent, state: &AppState) -> Vec<Action> {
        if self.editing() {
            return match self.active_input().handle_key(key) {
                InputEvent::Confirmed => self.submit(state),
                _ => Vec::new(),
            };
        }

        match key.code {
            KeyCode::Up | KeyCode::Char('k') => {
                self.field = MusicField::Lyrics;
                Vec::new()
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.field = MusicField::Style;
                Vec::new()
            }
            KeyCode::Char('i') | KeyCode::Char('e') => {
                self.active_input().activate();
                Vec::new()
            }
            KeyCode::Left | KeyCode::Char('h') => vec![Action::CycleModel {
                kind: MediaKind::Music,
                step: -1,
            }],
            KeyCode::Right | KeyCode::Char('l') => vec![Action::CycleModel {
                kind: MediaKind::Music,
                step: 1,
            }],
            KeyCode::Enter => self.submit(state),
            KeyCode::Char('y') => state
                .job(MediaKind::Music)
                .result_url()
                .map(|u| Action::CopyToClipboard(u.to_string()))
                .into_iter()
                .collect(),
            _ => Vec::new(),
        }
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, state: &AppState) {
        let block = pane_chrome(
            "Music",
            Some('4'),
            true,
            job_badge(state.job(MediaKind::Music)),
        );
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Min(0),
            ])
            .split(inner);

        draw_model_line(frame, rows[0], state, MediaKind::Music);
        self.lyrics
            .draw(frame, rows[1], self.field == MusicField::Lyrics);
        self.style
            .draw(frame, rows[2], self.field == MusicField::Style);

        let output = Paragraph::new(job_output_lines(state.job(MediaKind::Music)))
            .wrap(Wrap { trim: false });
        frame.render_widget(output, rows[3]);
    }
}
