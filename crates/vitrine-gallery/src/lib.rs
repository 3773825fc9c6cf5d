//! Product media gallery manager.
//!
//! Owns the persisted media of one product plus the files staged for upload,
//! enforces the capacity and size limits, keeps a single primary item and
//! produces the plans the API client executes on submit or delete.

pub mod gallery;
pub mod plan;
pub mod preview;
pub mod source;
pub mod validation;

pub use gallery::{Gallery, GalleryEntry, ItemRef, MediaItem, Rejection, StageOutcome, StagedId};
pub use plan::{DeletePlan, SubmitPlan, UploadRequest};
pub use preview::{InlinePreviewCodec, PreviewCodec, PreviewHandle};
pub use source::SourceFile;
