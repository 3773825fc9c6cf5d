//! Plans produced by the gallery and executed by the API client.

use bytes::Bytes;
use vitrine_core::MediaId;

use crate::gallery::StagedId;

/// One create-media call for a staged item.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub product_id: String,
    pub staged_id: StagedId,
    pub file_name: String,
    pub content_type: String,
    pub payload: Bytes,
    pub is_primary: bool,
    /// Position in the contiguous persisted + staged ordering space.
    pub order: i32,
}

/// Everything needed to bring the server in line with the local gallery.
///
/// Demotions must be confirmed before any create or promotion is issued so
/// the server never holds two primaries.
#[derive(Debug, Clone, Default)]
pub struct SubmitPlan {
    pub product_id: String,
    pub creates: Vec<UploadRequest>,
    /// Persisted items primary on the server but not locally.
    pub demotions: Vec<MediaId>,
    /// Persisted item primary locally but not on the server.
    pub promotion: Option<MediaId>,
}

impl SubmitPlan {
    pub fn is_empty(&self) -> bool {
        self.creates.is_empty() && self.demotions.is_empty() && self.promotion.is_none()
    }

    /// Server ids whose primary flag flips, demotions first.
    pub fn primary_changes(&self) -> Vec<MediaId> {
        self.demotions
            .iter()
            .chain(self.promotion.iter())
            .cloned()
            .collect()
    }
}

/// Delete one persisted item; promote another once the delete is confirmed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletePlan {
    pub delete: MediaId,
    pub promote: Option<MediaId>,
}
