//! AppState — shared read-only data passed to all components during render
//! and key handling.
//!
//! Components read this; only the App event loop writes to it.  Each media
//! kind has its own job view, so a poll finishing on a hidden tab still
//! lands in the right place.

use std::collections::HashMap;

use genbox_proto::api::UserInfo;
use genbox_proto::catalog::{MediaKind, ModelCatalog, ModelEntry};

use crate::action::Tab;

/// Header badge mirroring the startup-load / identity state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusBadge {
    #[default]
    Loading,
    Ok,
    NoIdentity,
    Error,
}

impl StatusBadge {
    pub fn label(self) -> &'static str {
        match self {
            StatusBadge::Loading => "LOADING",
            StatusBadge::Ok => "OK",
            StatusBadge::NoIdentity => "NO ID",
            StatusBadge::Error => "ERR",
        }
    }
}

/// Lifecycle of the submission shown in a tab's output region.
#[derive(Debug, Clone, Default)]
pub enum JobPhase {
    #[default]
    Idle,
    Submitting,
    Queued {
        job_id: String,
        submitted_at: chrono::DateTime<chrono::Local>,
    },
    Waiting {
        job_id: String,
        elapsed_secs: u64,
        status: String,
        url: Option<String>,
    },
    Done {
        url: String,
    },
    TimedOut,
    Failed {
        message: String,
    },
}

impl JobPhase {
    /// The finished result url, when there is one to open or copy.
    pub fn result_url(&self) -> Option<&str> {
        match self {
            JobPhase::Done { url } => Some(url),
            _ => None,
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(
            self,
            JobPhase::Submitting | JobPhase::Queued { .. } | JobPhase::Waiting { .. }
        )
    }

    /// The job id being polled, if the phase carries one.
    pub fn job_id(&self) -> Option<&str> {
        match self {
            JobPhase::Queued { job_id, .. } | JobPhase::Waiting { job_id, .. } => Some(job_id),
            _ => None,
        }
    }
}

/// One question/answer pair in the chat transcript.
#[derive(Debug, Clone)]
pub struct ChatExchange {
    pub message: String,
    pub reply: String,
}

static IDLE: JobPhase = JobPhase::Idle;

/// The full shared state of the application.
pub struct AppState {
    // ── Backend data ────────────────────────────────────────────────────────
    pub catalog: ModelCatalog,
    pub catalog_loaded: bool,
    pub user: Option<UserInfo>,

    // ── Header ──────────────────────────────────────────────────────────────
    /// Identity/load status line, shown until `user` is available.
    pub user_line: String,
    pub badge: StatusBadge,

    // ── UI mode ─────────────────────────────────────────────────────────────
    pub tab: Tab,
    /// Selected model index per kind.  Clamped against the catalog on read.
    pub selected: HashMap<MediaKind, usize>,

    // ── Per-kind job views ──────────────────────────────────────────────────
    image_job: JobPhase,
    video_job: JobPhase,
    music_job: JobPhase,

    // ── Chat ────────────────────────────────────────────────────────────────
    pub chat_busy: bool,
    pub chat_history: Vec<ChatExchange>,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            catalog: ModelCatalog::default(),
            catalog_loaded: false,
            user: None,
            user_line: "Loading…".to_string(),
            badge: StatusBadge::Loading,
            tab: Tab::Chat,
            selected: HashMap::new(),
            image_job: JobPhase::Idle,
            video_job: JobPhase::Idle,
            music_job: JobPhase::Idle,
            chat_busy: false,
            chat_history: Vec::new(),
        }
    }

    pub fn models(&self, kind: MediaKind) -> &[ModelEntry] {
        self.catalog.for_kind(kind)
    }

    /// Currently selected model for a kind, if the catalog has any.
    pub fn selected_model(&self, kind: MediaKind) -> Option<&ModelEntry> {
        let models = self.models(kind);
        if models.is_empty() {
            return None;
        }
        let idx = self.selected.get(&kind).copied().unwrap_or(0);
        models.get(idx.min(models.len() - 1))
    }

    pub fn selected_index(&self, kind: MediaKind) -> usize {
        let len = self.models(kind).len();
        if len == 0 {
            return 0;
        }
        self.selected.get(&kind).copied().unwrap_or(0).min(len - 1)
    }

    /// Job view for an async kind.  Chat has no job lifecycle and always
    /// reads as idle.
    pub fn job(&self, kind: MediaKind) -> &JobPhase {
        match kind {
            MediaKind::Image => &self.image_job,
            MediaKind::Video => &self.video_job,
            MediaKind::Music => &self.music_job,
            MediaKind::Chat => &IDLE,
        }
    }

    pub fn job_mut(&mut self, kind: MediaKind) -> Option<&mut JobPhase> {
        match kind {
            MediaKind::Image => Some(&mut self.image_job),
            MediaKind::Video => Some(&mut self.video_job),
            MediaKind::Music => Some(&mut self.music_job),
            MediaKind::Chat => None,
        }
    }
}
