//! Per-file checks run before a file may enter the gallery.

use vitrine_core::{GalleryConfig, MediaKind, RejectionReason};

use crate::source::SourceFile;

fn validate_content_type(
    content_type: &str,
    config: &GalleryConfig,
) -> Result<MediaKind, RejectionReason> {
    let unsupported = || RejectionReason::UnsupportedType {
        content_type: content_type.to_string(),
    };

    if !config.accepts(content_type) {
        return Err(unsupported());
    }
    MediaKind::from_content_type(content_type).ok_or_else(unsupported)
}

fn validate_file_size(file_size: u64, max_size: u64) -> Result<(), RejectionReason> {
    if file_size > max_size {
        return Err(RejectionReason::FileTooLarge {
            size: file_size,
            limit: max_size,
        });
    }
    Ok(())
}

/// Size ceiling for a media kind.
pub fn size_limit(kind: MediaKind, config: &GalleryConfig) -> u64 {
    match kind {
        MediaKind::Image => config.max_image_bytes,
        MediaKind::Video => config.max_video_bytes,
    }
}

/// Type check first, then the type-specific size ceiling (inclusive).
pub fn validate_file(file: &SourceFile, config: &GalleryConfig) -> Result<MediaKind, RejectionReason> {
    let kind = validate_content_type(&file.content_type, config)?;
    validate_file_size(file.size(), size_limit(kind, config))?;
    Ok(kind)
}
