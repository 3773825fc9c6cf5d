//! The gallery aggregate: persisted media plus staged files, one primary.
//!
//! The primary item is a single pointer (`Option<ItemRef>`) rather than a flag
//! on every item, so two items can never both claim it. Persisted records keep
//! their `is_primary` field as the last known server state; the pointer is the
//! local truth, and `reconcile_on_submit` computes the difference.

use futures::future::join_all;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use vitrine_core::models::sort_for_display;
use vitrine_core::{
    AppError, ErrorMetadata, GalleryConfig, LogLevel, MediaId, MediaKind, PersistedMedia,
    RejectionReason, Result,
};

use crate::plan::{DeletePlan, SubmitPlan, UploadRequest};
use crate::preview::{PreviewCodec, PreviewHandle};
use crate::source::SourceFile;
use crate::validation::validate_file;

/// Local handle of a staged item, unique within one gallery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct StagedId(u64);

impl fmt::Display for StagedId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "staged-{}", self.0)
    }
}

/// Reference to any item of the merged gallery.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "source", content = "id", rename_all = "lowercase")]
pub enum ItemRef {
    Staged(StagedId),
    Persisted(MediaId),
}

impl fmt::Display for ItemRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemRef::Staged(id) => write!(f, "{}", id),
            ItemRef::Persisted(id) => write!(f, "media {}", id),
        }
    }
}

/// A validated file waiting for upload.
#[derive(Debug)]
pub struct MediaItem {
    id: StagedId,
    source: SourceFile,
    preview: PreviewHandle,
    kind: MediaKind,
}

impl MediaItem {
    pub fn id(&self) -> StagedId {
        self.id
    }

    pub fn source(&self) -> &SourceFile {
        &self.source
    }

    pub fn preview(&self) -> &PreviewHandle {
        &self.preview
    }

    pub fn kind(&self) -> MediaKind {
        self.kind
    }
}

/// A file that was not staged, and why.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    pub file_name: String,
    pub reason: RejectionReason,
}

impl Rejection {
    /// Notification text, e.g. "clip.mov must be smaller than 50MB".
    pub fn message(&self) -> String {
        format!("{} {}", self.file_name, self.reason.client_message())
    }
}

/// Result of one `stage_files` call.
#[derive(Debug, Default)]
pub struct StageOutcome {
    pub accepted: Vec<StagedId>,
    /// In input order.
    pub rejections: Vec<Rejection>,
}

/// One row of the merged display view.
#[derive(Debug, Clone, Serialize)]
pub struct GalleryEntry {
    pub item: ItemRef,
    pub kind: MediaKind,
    /// Stored location for persisted items, preview URL for staged ones.
    pub display_url: String,
    pub is_primary: bool,
    pub order: Option<i32>,
}

pub struct Gallery {
    config: GalleryConfig,
    codec: Arc<dyn PreviewCodec>,
    persisted: Vec<PersistedMedia>,
    staged: Vec<MediaItem>,
    primary: Option<ItemRef>,
    next_staged: u64,
}

impl fmt::Debug for Gallery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Gallery")
            .field("persisted", &self.persisted.len())
            .field("staged", &self.staged.len())
            .field("primary", &self.primary)
            .finish()
    }
}

impl Gallery {
    pub fn new(config: GalleryConfig, codec: Arc<dyn PreviewCodec>) -> Self {
        Self {
            config,
            codec,
            persisted: Vec::new(),
            staged: Vec::new(),
            primary: None,
            next_staged: 0,
        }
    }

    /// Gallery for an existing product, seeded from its fetched media.
    pub fn with_persisted(
        config: GalleryConfig,
        codec: Arc<dyn PreviewCodec>,
        media: Vec<PersistedMedia>,
    ) -> Self {
        let mut gallery = Self::new(config, codec);
        gallery.reset_from_server(media);
        gallery
    }

    pub fn config(&self) -> &GalleryConfig {
        &self.config
    }

    pub fn len(&self) -> usize {
        self.persisted.len() + self.staged.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn remaining_capacity(&self) -> usize {
        self.config.max_items.saturating_sub(self.len())
    }

    /// Persisted media in display order, with server-side primary flags.
    pub fn persisted(&self) -> &[PersistedMedia] {
        &self.persisted
    }

    pub fn staged(&self) -> &[MediaItem] {
        &self.staged
    }

    pub fn staged_item(&self, id: StagedId) -> Option<&MediaItem> {
        self.staged.iter().find(|item| item.id == id)
    }

    pub fn primary(&self) -> Option<&ItemRef> {
        self.primary.as_ref()
    }

    pub fn is_primary(&self, item: &ItemRef) -> bool {
        self.primary.as_ref() == Some(item)
    }

    pub fn contains(&self, item: &ItemRef) -> bool {
        match item {
            ItemRef::Staged(id) => self.staged.iter().any(|m| m.id == *id),
            ItemRef::Persisted(id) => self.persisted.iter().any(|m| m.id == *id),
        }
    }

    /// Merged view: persisted items first, then staged items in staging order.
    pub fn entries(&self) -> Vec<GalleryEntry> {
        let persisted = self.persisted.iter().map(|media| {
            let item = ItemRef::Persisted(media.id.clone());
            GalleryEntry {
                is_primary: self.is_primary(&item),
                item,
                kind: media.kind(),
                display_url: media.location.clone(),
                order: Some(media.order),
            }
        });
        let staged = self.staged.iter().map(|staged| {
            let item = ItemRef::Staged(staged.id);
            GalleryEntry {
                is_primary: self.is_primary(&item),
                item,
                kind: staged.kind,
                display_url: staged.preview.as_str().to_string(),
                order: None,
            }
        });
        persisted.chain(staged).collect()
    }

    /// Validate, preview and stage a batch of selected files.
    ///
    /// Only the first `remaining_capacity()` files are considered; the rest are
    /// rejected with `CapacityExceeded` before validation. Previews run
    /// concurrently and the staged queue changes once, after all of them
    /// finish.
    pub async fn stage_files(&mut self, files: Vec<SourceFile>) -> StageOutcome {
        let max_items = self.config.max_items;
        let remaining = self.remaining_capacity();
        let mut rejections: Vec<(usize, Rejection)> = Vec::new();
        let mut candidates: Vec<(usize, SourceFile, MediaKind)> = Vec::new();

        for (index, file) in files.into_iter().enumerate() {
            let verdict = if index < remaining {
                validate_file(&file, &self.config)
            } else {
                Err(RejectionReason::CapacityExceeded { max_items })
            };
            match verdict {
                Ok(kind) => candidates.push((index, file, kind)),
                Err(reason) => {
                    log_rejection(&file.name, &reason);
                    rejections.push((
                        index,
                        Rejection {
                            file_name: file.name,
                            reason,
                        },
                    ));
                }
            }
        }

        let codec = Arc::clone(&self.codec);
        let previews = join_all(
            candidates
                .iter()
                .map(|(_, file, kind)| codec.preview(file, *kind)),
        )
        .await;

        let mut accepted = Vec::new();
        for ((index, file, kind), preview) in candidates.into_iter().zip(previews) {
            match preview {
                Ok(preview) => {
                    let id = StagedId(self.next_staged);
                    self.next_staged += 1;
                    if self.primary.is_none() {
                        self.primary = Some(ItemRef::Staged(id));
                    }
                    self.staged.push(MediaItem {
                        id,
                        source: file,
                        preview,
                        kind,
                    });
                    accepted.push(id);
                }
                Err(err) => {
                    let reason = RejectionReason::PreviewFailed(err.to_string());
                    log_rejection(&file.name, &reason);
                    rejections.push((
                        index,
                        Rejection {
                            file_name: file.name,
                            reason,
                        },
                    ));
                }
            }
        }

        rejections.sort_by_key(|(index, _)| *index);

        tracing::info!(
            accepted = accepted.len(),
            rejected = rejections.len(),
            total = self.len(),
            "Staged media files"
        );

        StageOutcome {
            accepted,
            rejections: rejections.into_iter().map(|(_, r)| r).collect(),
        }
    }

    /// Make `item` the only primary. Local and optimistic for persisted items.
    pub fn set_primary(&mut self, item: &ItemRef) -> Result<()> {
        if !self.contains(item) {
            return Err(AppError::NotFound(format!("Gallery item {} not found", item)));
        }
        if self.is_primary(item) {
            return Ok(());
        }

        tracing::debug!(previous = ?self.primary, next = %item, "Primary media changed");
        self.primary = Some(item.clone());
        Ok(())
    }

    /// Drop a staged item and release its preview.
    ///
    /// A removed primary passes to the first remaining staged item, or to the
    /// lowest-order persisted item when nothing else is staged.
    pub fn remove_staged(&mut self, id: StagedId) -> Result<()> {
        let position = self
            .staged
            .iter()
            .position(|item| item.id == id)
            .ok_or_else(|| AppError::NotFound(format!("Staged item {} not found", id)))?;

        let item = self.staged.remove(position);
        self.release(&item);

        if self.is_primary(&ItemRef::Staged(id)) {
            self.primary = self
                .first_staged()
                .or_else(|| self.lowest_order_persisted());
        }

        tracing::debug!(staged_id = %id, primary = ?self.primary, "Staged item removed");
        Ok(())
    }

    /// Plan the calls that bring the server in line with this gallery.
    pub fn reconcile_on_submit(&self, product_id: &str) -> SubmitPlan {
        let base_order = self.persisted.len();

        let creates = self
            .staged
            .iter()
            .enumerate()
            .map(|(index, item)| UploadRequest {
                product_id: product_id.to_string(),
                staged_id: item.id,
                file_name: item.source.name.clone(),
                content_type: item.source.content_type.clone(),
                payload: item.source.data.clone(),
                is_primary: self.is_primary(&ItemRef::Staged(item.id)),
                order: (base_order + index) as i32,
            })
            .collect();

        let demotions = self
            .persisted
            .iter()
            .filter(|media| {
                media.is_primary && !self.is_primary(&ItemRef::Persisted(media.id.clone()))
            })
            .map(|media| media.id.clone())
            .collect();

        let promotion = match &self.primary {
            Some(ItemRef::Persisted(id)) => self
                .persisted
                .iter()
                .find(|media| media.id == *id && !media.is_primary)
                .map(|media| media.id.clone()),
            _ => None,
        };

        let plan = SubmitPlan {
            product_id: product_id.to_string(),
            creates,
            demotions,
            promotion,
        };

        tracing::info!(
            product_id = %product_id,
            creates = plan.creates.len(),
            demotions = plan.demotions.len(),
            promotion = plan.promotion.is_some(),
            "Submit plan ready"
        );

        plan
    }

    /// Plan the deletion of a persisted item. State is unchanged until
    /// `confirm_deleted` is called with the plan.
    pub fn delete_persisted(&self, id: &MediaId) -> Result<DeletePlan> {
        if !self.persisted.iter().any(|media| media.id == *id) {
            return Err(AppError::NotFound(format!("Media {} not found", id)));
        }

        let promote = if self.is_primary(&ItemRef::Persisted(id.clone())) {
            self.persisted
                .iter()
                .filter(|media| media.id != *id)
                .min_by_key(|media| media.order)
                .map(|media| media.id.clone())
        } else {
            None
        };

        Ok(DeletePlan {
            delete: id.clone(),
            promote,
        })
    }

    /// Apply a delete the server has confirmed.
    ///
    /// When the deleted item was primary and no persisted item is left to
    /// promote, the first staged item takes over.
    pub fn confirm_deleted(&mut self, plan: &DeletePlan) {
        self.persisted.retain(|media| media.id != plan.delete);

        if self.is_primary(&ItemRef::Persisted(plan.delete.clone())) {
            self.primary = plan
                .promote
                .clone()
                .filter(|id| self.persisted.iter().any(|media| media.id == *id))
                .map(ItemRef::Persisted)
                .or_else(|| self.first_staged());
        }

        tracing::debug!(media_id = %plan.delete, primary = ?self.primary, "Persisted item deleted");
    }

    /// Replace local state with freshly fetched server records.
    ///
    /// Staged items are discarded. If the server reports several primaries the
    /// first in display order wins locally; if it reports none, the first item
    /// in display order is primary until the next submit promotes it.
    pub fn reset_from_server(&mut self, mut media: Vec<PersistedMedia>) {
        self.teardown();
        sort_for_display(&mut media);

        let primaries = media.iter().filter(|m| m.is_primary).count();
        if primaries > 1 {
            tracing::warn!(primaries, "Server reports more than one primary media");
        }

        self.primary = media
            .iter()
            .find(|m| m.is_primary)
            .or_else(|| media.first())
            .map(|m| ItemRef::Persisted(m.id.clone()));
        self.persisted = media;
    }

    /// Refresh persisted records from the server without touching staged items.
    ///
    /// A staged primary survives; otherwise the server's primary is adopted,
    /// falling back to the first staged item, then the lowest-order persisted
    /// item, when the server has none.
    pub fn sync_persisted(&mut self, mut media: Vec<PersistedMedia>) {
        sort_for_display(&mut media);
        self.persisted = media;

        if matches!(self.primary, Some(ItemRef::Staged(_))) {
            return;
        }
        self.primary = self
            .persisted
            .iter()
            .find(|m| m.is_primary)
            .map(|m| ItemRef::Persisted(m.id.clone()))
            .or_else(|| self.first_staged())
            .or_else(|| self.lowest_order_persisted());
    }

    /// Discard every staged item, releasing their previews.
    ///
    /// A staged primary falls back to the server's primary, or to the
    /// lowest-order persisted item.
    pub fn teardown(&mut self) {
        let staged = std::mem::take(&mut self.staged);
        for item in &staged {
            self.release(item);
        }
        if matches!(self.primary, Some(ItemRef::Staged(_))) {
            self.primary = self
                .persisted
                .iter()
                .find(|m| m.is_primary)
                .map(|m| ItemRef::Persisted(m.id.clone()))
                .or_else(|| self.lowest_order_persisted());
        }
    }

    fn release(&self, item: &MediaItem) {
        if item.kind == MediaKind::Video {
            self.codec.release(&item.preview);
        }
    }

    fn first_staged(&self) -> Option<ItemRef> {
        self.staged.first().map(|item| ItemRef::Staged(item.id))
    }

    fn lowest_order_persisted(&self) -> Option<ItemRef> {
        self.persisted
            .iter()
            .min_by_key(|media| media.order)
            .map(|media| ItemRef::Persisted(media.id.clone()))
    }
}

fn log_rejection(file_name: &str, reason: &RejectionReason) {
    let code = reason.error_code();
    match reason.log_level() {
        LogLevel::Debug => tracing::debug!(file_name = %file_name, code, reason = %reason, "File rejected"),
        LogLevel::Warn => tracing::warn!(file_name = %file_name, code, reason = %reason, "File rejected"),
        LogLevel::Error => tracing::error!(file_name = %file_name, code, reason = %reason, "File rejected"),
    }
}

impl Drop for Gallery {
    fn drop(&mut self) {
        self.teardown();
    }
}
