//! File-to-preview conversion.
//!
//! Images become inline data URLs. Videos become object URLs, which are a
//! scarce resource and must be released through the codec that issued them.

use async_trait::async_trait;
use base64::Engine;
use std::collections::HashSet;
use std::sync::Mutex;
use vitrine_core::MediaKind;

use crate::source::SourceFile;

/// Display-ready representation of a staged file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreviewHandle {
    /// `data:<mime>;base64,...`
    DataUrl(String),
    /// `blob:...`, valid until released
    ObjectUrl(String),
}

impl PreviewHandle {
    pub fn as_str(&self) -> &str {
        match self {
            PreviewHandle::DataUrl(url) | PreviewHandle::ObjectUrl(url) => url,
        }
    }
}

#[async_trait]
pub trait PreviewCodec: Send + Sync {
    async fn preview(&self, file: &SourceFile, kind: MediaKind) -> anyhow::Result<PreviewHandle>;

    /// Release a handle issued by `preview`. Releasing twice is harmless.
    fn release(&self, handle: &PreviewHandle);
}

/// In-process codec that tracks the object URLs it has handed out.
#[derive(Debug, Default)]
pub struct InlinePreviewCodec {
    object_urls: Mutex<HashSet<String>>,
}

impl InlinePreviewCodec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of object URLs issued and not yet released.
    pub fn live_object_urls(&self) -> usize {
        self.object_urls
            .lock()
            .map(|urls| urls.len())
            .unwrap_or_default()
    }
}

#[async_trait]
impl PreviewCodec for InlinePreviewCodec {
    async fn preview(&self, file: &SourceFile, kind: MediaKind) -> anyhow::Result<PreviewHandle> {
        if file.data.is_empty() {
            anyhow::bail!("{} is empty", file.name);
        }

        match kind {
            MediaKind::Image => {
                let encoded = base64::engine::general_purpose::STANDARD.encode(&file.data);
                Ok(PreviewHandle::DataUrl(format!(
                    "data:{};base64,{}",
                    file.content_type, encoded
                )))
            }
            MediaKind::Video => {
                let url = format!("blob:vitrine/{}", uuid::Uuid::new_v4());
                self.object_urls
                    .lock()
                    .map_err(|_| anyhow::anyhow!("object URL registry poisoned"))?
                    .insert(url.clone());
                Ok(PreviewHandle::ObjectUrl(url))
            }
        }
    }

    fn release(&self, handle: &PreviewHandle) {
        if let PreviewHandle::ObjectUrl(url) = handle {
            if let Ok(mut urls) = self.object_urls.lock() {
                urls.remove(url);
            }
        }
    }
}
