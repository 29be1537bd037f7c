use serde::{Deserialize, Serialize};

/// The four media kinds the backend serves.  Chat is synchronous; the other
/// three submit a job and poll for its result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Chat,
    Image,
    Video,
    Music,
}

impl MediaKind {
    pub const ALL: [MediaKind; 4] = [
        MediaKind::Chat,
        MediaKind::Image,
        MediaKind::Video,
        MediaKind::Music,
    ];

    /// Lowercase name as used in endpoint paths and log lines.
    pub fn slug(self) -> &'static str {
        match self {
            MediaKind::Chat => "chat",
            MediaKind::Image => "image",
            MediaKind::Video => "video",
            MediaKind::Music => "music",
        }
    }

    /// Display label for tabs / headers.
    pub fn label(self) -> &'static str {
        match self {
            MediaKind::Chat => "Chat",
            MediaKind::Image => "Image",
            MediaKind::Video => "Video",
            MediaKind::Music => "Music",
        }
    }

    /// True for kinds that go through the submit→poll job flow.
    pub fn is_async(self) -> bool {
        !matches!(self, MediaKind::Chat)
    }

    /// Endpoint that accepts a generation request for this kind.
    pub fn submit_path(self) -> String {
        match self {
            MediaKind::Chat => "/api/chat".to_string(),
            other => format!("/api/{}/submit", other.slug()),
        }
    }

    /// Endpoint that reports the state of a queued job.  Only meaningful for
    /// async kinds; chat never has a job to look up.
    pub fn result_path(self, job_id: &str) -> String {
        format!("/api/{}/result/{}", self.slug(), job_id)
    }
}

/// One selectable model.  `title` is optional on the wire; display falls
/// back to the id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelEntry {
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
}

impl ModelEntry {
    pub fn display_title(&self) -> &str {
        self.title.as_deref().filter(|t| !t.is_empty()).unwrap_or(&self.id)
    }
}

/// What `/api/models` returns: an ordered model list per media kind.
/// A kind the backend does not serve is simply absent, which deserializes
/// to an empty list.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModelCatalog {
    #[serde(default)]
    pub chat: Vec<ModelEntry>,
    #[serde(default)]
    pub image: Vec<ModelEntry>,
    #[serde(default)]
    pub video: Vec<ModelEntry>,
    #[serde(default)]
    pub music: Vec<ModelEntry>,
}

impl ModelCatalog {
    pub fn for_kind(&self, kind: MediaKind) -> &[ModelEntry] {
        match kind {
            MediaKind::Chat => &self.chat,
            MediaKind::Image => &self.image,
            MediaKind::Video => &self.video,
            MediaKind::Music => &self.music,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_absent_kind_is_empty() {
        let catalog: ModelCatalog = serde_json::from_str(
            r#"{"chat":[{"id":"a","title":"A"}],"image":[{"id":"b"}]}"#,
        )
        .unwrap();
        assert_eq!(catalog.chat.len(), 1);
        assert_eq!(catalog.image.len(), 1);
        assert!(catalog.video.is_empty());
        assert!(catalog.music.is_empty());
    }

    #[test]
    fn test_catalog_preserves_order() {
        let catalog: ModelCatalog = serde_json::from_str(
            r#"{"video":[{"id":"z"},{"id":"a"},{"id":"m"}]}"#,
        )
        .unwrap();
        let ids: Vec<&str> = catalog
            .for_kind(MediaKind::Video)
            .iter()
            .map(|m| m.id.as_str())
            .collect();
        assert_eq!(ids, vec!["z", "a", "m"]);
    }

    #[test]
    fn test_display_title_falls_back_to_id() {
        let named: ModelEntry = serde_json::from_str(r#"{"id":"x","title":"Model X"}"#).unwrap();
        assert_eq!(named.display_title(), "Model X");

        let bare: ModelEntry = serde_json::from_str(r#"{"id":"x"}"#).unwrap();
        assert_eq!(bare.display_title(), "x");

        let empty: ModelEntry = serde_json::from_str(r#"{"id":"x","title":""}"#).unwrap();
        assert_eq!(empty.display_title(), "x");
    }

    #[test]
    fn test_endpoint_paths() {
        assert_eq!(MediaKind::Chat.submit_path(), "/api/chat");
        assert_eq!(MediaKind::Image.submit_path(), "/api/image/submit");
        assert_eq!(
            MediaKind::Music.result_path("job-7"),
            "/api/music/result/job-7"
        );
    }
}
