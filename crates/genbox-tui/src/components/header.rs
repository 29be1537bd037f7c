//! Header — 2-row top bar.
//!
//! Row 1: app name, status badge, identity/balance line.
//! Row 2: tab strip; tabs with an active background job get a pending dot.
//!
//! Not focusable.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::action::Tab;
use crate::app_state::{AppState, StatusBadge};
use crate::theme::{
    C_BADGE_ERR, C_BADGE_OK, C_BADGE_PENDING, C_MUTED, C_PRIMARY, C_SECONDARY,
};

pub struct Header;

impl Header {
    pub fn draw(&self, frame: &mut Frame, area: Rect, state: &AppState) {
        if area.height == 0 {
            return;
        }
        if area.height == 1 {
            frame.render_widget(Paragraph::new(build_row1(state)), area);
            return;
        }

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(1), Constraint::Length(1)])
            .split(area);

        frame.render_widget(Paragraph::new(build_row1(state)), rows[0]);
        frame.render_widget(Paragraph::new(tab_strip(state)), rows[1]);
    }
}

fn badge_color(badge: StatusBadge) -> Color {
    match badge {
        StatusBadge::Loading => C_BADGE_PENDING,
        StatusBadge::Ok => C_BADGE_OK,
        StatusBadge::NoIdentity => C_BADGE_PENDING,
        StatusBadge::Error => C_BADGE_ERR,
    }
}

fn build_row1(state: &AppState) -> Line<'static> {
    let user_style = if state.badge == StatusBadge::Error {
        Style::default().fg(C_BADGE_ERR)
    } else {
        Style::default().fg(C_SECONDARY)
    };
    let user_text = match &state.user {
        Some(u) => format!(
            "tg_id: {} • free: {} • pro: {}",
            u.tg_id, u.free_credits, u.pro_credits
        ),
        None => state.user_line.clone(),
    };

    Line::from(vec![
        Span::styled(
            " genbox ",
            Style::default().fg(C_PRIMARY).add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("[{}]", state.badge.label()),
            Style::default()
                .fg(badge_color(state.badge))
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
        Span::styled(user_text, user_style),
    ])
}

fn tab_strip(state: &AppState) -> Line<'static> {
    let mut spans: Vec<Span<'static>> = vec![Span::raw(" ")];
    for (i, tab) in Tab::ALL.iter().enumerate() {
        let active = state.tab == *tab;
        let style = if active {
            Style::default().fg(C_PRIMARY).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(C_MUTED)
        };
        spans.push(Span::styled(format!("[{}] {}", i + 1, tab.label()), style));
        if state.job(tab.kind()).is_active() {
            spans.push(Span::styled("●", Style::default().fg(C_BADGE_PENDING)));
        }
        spans.push(Span::raw("  "));
    }
    Line::from(spans)
}
