use anyhow::Context;
use serde::Serialize;
use std::path::Path;
use vitrine_core::ErrorMetadata;
use vitrine_gallery::{Rejection, SourceFile};

/// One rejected file as printed by `vitrine upload`.
#[derive(Debug, Serialize)]
pub struct RejectedFile {
    pub file: String,
    pub code: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<&'static str>,
}

impl From<&Rejection> for RejectedFile {
    fn from(rejection: &Rejection) -> Self {
        Self {
            file: rejection.file_name.clone(),
            code: rejection.reason.error_code(),
            message: rejection.message(),
            action: rejection.reason.suggested_action(),
        }
    }
}

/// MIME type guessed from a file extension.
pub fn content_type_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "avif" => "image/avif",
        "mp4" => "video/mp4",
        "mov" => "video/quicktime",
        "webm" => "video/webm",
        _ => "application/octet-stream",
    }
}

/// Read a local file into a `SourceFile` ready for staging.
pub async fn read_source_file(path: &Path) -> anyhow::Result<SourceFile> {
    let data = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    Ok(SourceFile::new(name, content_type_for(path), data))
}

/// Truncate a string to max_len characters, appending "..." if truncated.
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Initialize tracing for CLI binaries. Logs go to stderr so stdout stays JSON.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();
}
