use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Server-assigned identity of a persisted media record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MediaId(pub String);

impl MediaId {
    pub fn new(id: impl Into<String>) -> Self {
        MediaId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MediaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for MediaId {
    fn from(id: &str) -> Self {
        MediaId(id.to_string())
    }
}

/// Media kind accepted by the product gallery
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
}

impl MediaKind {
    /// Classify a MIME type. Anything that is not `image/*` or `video/*` is `None`.
    pub fn from_content_type(content_type: &str) -> Option<Self> {
        let content_type = content_type.trim().to_lowercase();
        if content_type.starts_with("image/") {
            Some(MediaKind::Image)
        } else if content_type.starts_with("video/") {
            Some(MediaKind::Video)
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Image => "image",
            MediaKind::Video => "video",
        }
    }
}

/// A media record confirmed by the server.
///
/// The API names the stored file `media`; older serializers call it `image`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedMedia {
    pub id: MediaId,
    #[serde(rename = "media", alias = "image")]
    pub location: String,
    #[serde(default)]
    pub is_primary: bool,
    #[serde(default)]
    pub order: i32,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl PersistedMedia {
    /// Kind guessed from the stored file's extension. Defaults to image.
    pub fn kind(&self) -> MediaKind {
        let path = self.location.split(['?', '#']).next().unwrap_or_default();
        let ext = path.rsplit('.').next().unwrap_or("").to_lowercase();
        match ext.as_str() {
            "mp4" | "mov" | "webm" | "m4v" | "avi" | "mkv" => MediaKind::Video,
            _ => MediaKind::Image,
        }
    }
}

/// Sort media the way the server lists them: by `order`, primary first on ties.
pub fn sort_for_display(media: &mut [PersistedMedia]) {
    media.sort_by(|a, b| {
        a.order
            .cmp(&b.order)
            .then_with(|| b.is_primary.cmp(&a.is_primary))
    });
}
