//! Owned handle to a file chosen for staging.

use bytes::Bytes;

/// A file selected by the user, owned by the gallery until upload or discard.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub name: String,
    pub content_type: String,
    pub data: Bytes,
}

impl SourceFile {
    pub fn new(name: impl Into<String>, content_type: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            content_type: content_type.into(),
            data: data.into(),
        }
    }

    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }
}
