//! Generation panel — model selector, prompt input, and the job output
//! region.  Serves the image and video tabs; music has its own two-field
//! variant that reuses the output rendering below.

use ratatui::crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Paragraph, Wrap},
    Frame,
};

use genbox_proto::catalog::MediaKind;
use genbox_proto::job::GenerationRequest;

use crate::action::{Action, ComponentId};
use crate::app_state::{AppState, JobPhase};
use crate::component::Component;
use crate::components::fit_width;
use crate::theme::{
    style_default, style_error, style_muted, style_ok, style_secondary, C_BADGE_ERR, C_BADGE_OK,
    C_BADGE_PENDING, C_LINK, C_PRIMARY, C_SECONDARY,
};
use crate::widgets::input_box::{InputBox, InputEvent};
use crate::widgets::pane_chrome::{pane_chrome, Badge};

pub struct GenPanel {
    kind: MediaKind,
    id: ComponentId,
    number_key: char,
    prompt: InputBox,
}

impl GenPanel {
    pub fn new(kind: MediaKind, id: ComponentId, number_key: char) -> Self {
        Self {
            kind,
            id,
            number_key,
            prompt: InputBox::new("prompt", "describe what to generate…"),
        }
    }

    fn submit(&self, state: &AppState) -> Vec<Action> {
        let Some(model) = state.selected_model(self.kind) else {
            return Vec::new();
        };
        let prompt = self.prompt.text().trim().to_string();
        if prompt.is_empty() {
            return Vec::new();
        }
        vec![Action::Submit {
            kind: self.kind,
            request: GenerationRequest::Prompt {
                model: model.id.clone(),
                prompt,
            },
        }]
    }
}

impl Component for GenPanel {
    fn id(&self) -> ComponentId {
        self.id
    }

    fn editing(&self) -> bool {
        self.prompt.active
    }

    fn handle_key(&mut self, key: KeyEvent, state: &AppState) -> Vec<Action> {
        if self.prompt.active {
            return match self.prompt.handle_key(key) {
                InputEvent::Confirmed => self.submit(state),
                _ => Vec::new(),
            };
        }

        match key.code {
            KeyCode::Char('i') | KeyCode::Char('e') => {
                self.prompt.activate();
                Vec::new()
            }
            KeyCode::Left | KeyCode::Char('h') => vec![Action::CycleModel {
                kind: self.kind,
                step: -1,
            }],
            KeyCode::Right | KeyCode::Char('l') => vec![Action::CycleModel {
                kind: self.kind,
                step: 1,
            }],
            KeyCode::Enter => self.submit(state),
            KeyCode::Char('y') => state
                .job(self.kind)
                .result_url()
                .map(|u| Action::CopyToClipboard(u.to_string()))
                .into_iter()
                .collect(),
            _ => Vec::new(),
        }
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, state: &AppState) {
        let block = pane_chrome(
            self.kind.label(),
            Some(self.number_key),
            true,
            job_badge(state.job(self.kind)),
        );
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

        draw_model_line(frame, rows[0], state, self.kind);
        self.prompt.draw(frame, rows[1], true);

        let output = Paragraph::new(job_output_lines(state.job(self.kind)))
            .wrap(Wrap { trim: false });
        frame.render_widget(output, rows[2]);
    }
}

/// One-line model selector readout: current title and position in the list.
pub(crate) fn draw_model_line(frame: &mut Frame, area: Rect, state: &AppState, kind: MediaKind) {
    let line = match state.selected_model(kind) {
        Some(model) => {
            let total = state.models(kind).len();
            let max = (area.width as usize).saturating_sub(14);
            Line::from(vec![
                Span::styled(" model ", style_muted()),
                Span::styled(
                    fit_width(model.display_title(), max),
                    Style::default().fg(C_PRIMARY),
                ),
                Span::styled(
                    format!("  {}/{}", state.selected_index(kind) + 1, total),
                    Style::default().fg(C_SECONDARY),
                ),
            ])
        }
        None if state.catalog_loaded => {
            Line::from(Span::styled(" no models available", style_muted()))
        }
        None => Line::from(Span::styled(" loading models…", style_muted())),
    };
    frame.render_widget(Paragraph::new(line), area);
}

/// Pane badge for the current job phase.
pub(crate) fn job_badge(phase: &JobPhase) -> Option<Badge<'static>> {
    match phase {
        JobPhase::Idle => None,
        JobPhase::Submitting => Some(Badge {
            text: "SUBMIT",
            color: C_BADGE_PENDING,
        }),
        JobPhase::Queued { .. } | JobPhase::Waiting { .. } => Some(Badge {
            text: "POLLING",
            color: C_BADGE_PENDING,
        }),
        JobPhase::Done { .. } => Some(Badge {
            text: "DONE",
            color: C_BADGE_OK,
        }),
        JobPhase::TimedOut => Some(Badge {
            text: "TIMEOUT",
            color: C_BADGE_ERR,
        }),
        JobPhase::Failed { .. } => Some(Badge {
            text: "ERR",
            color: C_BADGE_ERR,
        }),
    }
}

/// Output-region text for a job phase.
pub(crate) fn job_output_lines(phase: &JobPhase) -> Vec<Line<'static>> {
    match phase {
        JobPhase::Idle => vec![Line::from(Span::styled(
            "No job yet. Write a prompt and press Enter.",
            style_muted(),
        ))],
        JobPhase::Submitting => vec![Line::from(Span::styled("Submitting…", style_secondary()))],
        JobPhase::Queued {
            job_id,
            submitted_at,
        } => vec![
            Line::from(Span::styled(format!("Job created: {job_id}"), style_default())),
            Line::from(Span::styled(
                format!("submitted at {}", submitted_at.format("%H:%M:%S")),
                style_muted(),
            )),
            Line::from(Span::styled("Waiting for the result…", style_secondary())),
        ],
        JobPhase::Waiting {
            job_id,
            elapsed_secs,
            status,
            url,
        } => {
            let mut lines = vec![
                Line::from(Span::styled(format!("Job {job_id}"), style_muted())),
                Line::from(Span::styled(
                    format!("Waiting… {elapsed_secs}s  status={status}"),
                    style_secondary(),
                )),
            ];
            if let Some(url) = url {
                lines.push(Line::from(Span::styled(
                    url.clone(),
                    Style::default().fg(C_LINK),
                )));
            }
            lines
        }
        JobPhase::Done { url } => vec![
            Line::from(Span::styled("Done ✓", style_ok())),
            Line::from(Span::styled(url.clone(), Style::default().fg(C_LINK))),
            Line::from(Span::styled("y copies the url", style_muted())),
        ],
        JobPhase::TimedOut => vec![Line::from(Span::styled(
            "Timed out waiting for the result.",
            style_error(),
        ))],
        JobPhase::Failed { message } => vec![Line::from(Span::styled(
            format!("Error: {message}"),
            style_error(),
        ))],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_idle_and_failed_have_output_text() {
        assert_eq!(job_output_lines(&JobPhase::Idle).len(), 1);
        let lines = job_output_lines(&JobPhase::Failed {
            message: "boom".into(),
        });
        assert!(format!("{lines:?}").contains("boom"));
    }

    #[test]
    fn test_done_badge_and_url() {
        let phase = JobPhase::Done {
            url: "https://cdn/x.png".into(),
        };
        assert_eq!(job_badge(&phase).unwrap().text, "DONE");
        assert!(format!("{:?}", job_output_lines(&phase)).contains("https://cdn/x.png"));
    }
}
