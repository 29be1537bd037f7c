//! Action enum — user intents flowing from components to the App.

use genbox_proto::catalog::MediaKind;
use genbox_proto::job::GenerationRequest;

/// Unique identifier for a tab panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentId {
    ChatPanel,
    ImagePanel,
    VideoPanel,
    MusicPanel,
}

/// Which tab is active.  Exactly one panel is visible at a time; switching
/// never touches in-flight submissions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Chat,
    Image,
    Video,
    Music,
}

impl Tab {
    pub const ALL: [Tab; 4] = [Tab::Chat, Tab::Image, Tab::Video, Tab::Music];

    pub fn kind(self) -> MediaKind {
        match self {
            Tab::Chat => MediaKind::Chat,
            Tab::Image => MediaKind::Image,
            Tab::Video => MediaKind::Video,
            Tab::Music => MediaKind::Music,
        }
    }

    pub fn label(self) -> &'static str {
        self.kind().label()
    }

    pub fn index(self) -> usize {
        Self::ALL.iter().position(|t| *t == self).unwrap_or(0)
    }

    /// Tab for the number keys 1–4.
    pub fn from_index(idx: usize) -> Option<Tab> {
        Self::ALL.get(idx).copied()
    }

    pub fn next(self) -> Tab {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> Tab {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

/// All actions that can flow through the system.
/// Components produce Actions; the App dispatches them.
#[derive(Debug, Clone)]
pub enum Action {
    // ── Navigation ───────────────────────────────────────────────────────────
    SwitchTab(Tab),
    NextTab,
    PrevTab,

    // ── Model selection ──────────────────────────────────────────────────────
    CycleModel { kind: MediaKind, step: i64 },

    // ── Submission ───────────────────────────────────────────────────────────
    SubmitChat { model: String, message: String },
    Submit {
        kind: MediaKind,
        request: GenerationRequest,
    },

    // ── System ───────────────────────────────────────────────────────────────
    CopyToClipboard(String),
    Quit,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tab_cycle_wraps() {
        assert_eq!(Tab::Music.next(), Tab::Chat);
        assert_eq!(Tab::Chat.prev(), Tab::Music);
        assert_eq!(Tab::Image.next(), Tab::Video);
    }

    #[test]
    fn test_tab_from_index() {
        assert_eq!(Tab::from_index(0), Some(Tab::Chat));
        assert_eq!(Tab::from_index(3), Some(Tab::Music));
        assert_eq!(Tab::from_index(4), None);
    }
}
