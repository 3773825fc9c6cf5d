//! Error types module
//!
//! Two families of errors live here. `RejectionReason` describes why a single
//! selected file was not staged; these are local, recoverable and reported per
//! file. `AppError` covers everything else, including `RemoteCallFailed`, which
//! the gallery never catches or retries.

use std::io;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for recoverable issues like limits
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Metadata describing how an error should be presented to the user.
pub trait ErrorMetadata {
    /// Machine-readable error code (e.g., "FILE_TOO_LARGE")
    fn error_code(&self) -> &'static str;

    /// Whether the operation can be attempted again
    fn is_recoverable(&self) -> bool;

    /// Suggested action for the user
    fn suggested_action(&self) -> Option<&'static str>;

    /// User-facing notification text
    fn client_message(&self) -> String;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

pub type Result<T, E = AppError> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Remote call failed{}: {message}", status.map(|s| format!(" with status {}", s)).unwrap_or_default())]
    RemoteCallFailed {
        status: Option<u16>,
        message: String,
    },

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Internal error with source")]
    InternalWithSource {
        message: String,
        #[source]
        source: anyhow::Error,
    },
}

impl AppError {
    /// Build a `RemoteCallFailed` from a non-success response.
    pub fn remote(status: u16, message: impl Into<String>) -> Self {
        if status == 401 {
            return AppError::Unauthorized(message.into());
        }
        AppError::RemoteCallFailed {
            status: Some(status),
            message: message.into(),
        }
    }

    /// HTTP status of a failed remote call, when one was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            AppError::RemoteCallFailed { status, .. } => *status,
            AppError::Unauthorized(_) => Some(401),
            _ => None,
        }
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::InternalWithSource {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<io::Error> for AppError {
    fn from(err: io::Error) -> Self {
        AppError::Internal(format!("IO error: {}", err))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::InvalidInput(format!("JSON parsing error: {}", err))
    }
}

/// Static metadata for each variant: (error_code, recoverable, suggested_action, log_level).
fn app_error_static_metadata(err: &AppError) -> (&'static str, bool, Option<&'static str>, LogLevel) {
    match err {
        AppError::Config(_) => (
            "CONFIG_ERROR",
            false,
            Some("Check the VITRINE_* environment variables"),
            LogLevel::Error,
        ),
        AppError::InvalidInput(_) => (
            "INVALID_INPUT",
            false,
            Some("Check the input and try again"),
            LogLevel::Debug,
        ),
        AppError::NotFound(_) => (
            "NOT_FOUND",
            false,
            Some("Verify the item still exists"),
            LogLevel::Debug,
        ),
        AppError::Unauthorized(_) => (
            "UNAUTHORIZED",
            false,
            Some("Sign in again"),
            LogLevel::Warn,
        ),
        AppError::RemoteCallFailed { status, .. } => (
            "REMOTE_CALL_FAILED",
            status.map_or(true, |s| s >= 500),
            Some("Reload the product and try again"),
            LogLevel::Error,
        ),
        AppError::Http(_) => (
            "HTTP_ERROR",
            true,
            Some("Check your connection and try again"),
            LogLevel::Error,
        ),
        AppError::Internal(_) | AppError::InternalWithSource { .. } => (
            "INTERNAL_ERROR",
            false,
            None,
            LogLevel::Error,
        ),
    }
}

impl ErrorMetadata for AppError {
    fn error_code(&self) -> &'static str {
        app_error_static_metadata(self).0
    }

    fn is_recoverable(&self) -> bool {
        app_error_static_metadata(self).1
    }

    fn suggested_action(&self) -> Option<&'static str> {
        app_error_static_metadata(self).2
    }

    fn log_level(&self) -> LogLevel {
        app_error_static_metadata(self).3
    }

    fn client_message(&self) -> String {
        match self {
            AppError::Config(_) => "The application is misconfigured".to_string(),
            AppError::InvalidInput(ref msg) => msg.clone(),
            AppError::NotFound(ref msg) => msg.clone(),
            AppError::Unauthorized(_) => "Your session has expired".to_string(),
            AppError::RemoteCallFailed { ref message, .. } => message.clone(),
            AppError::Http(_) => "Could not reach the server".to_string(),
            AppError::Internal(_) | AppError::InternalWithSource { .. } => {
                "Something went wrong".to_string()
            }
        }
    }
}

/// Why a selected file was not staged.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RejectionReason {
    #[error("unsupported type: {content_type}")]
    UnsupportedType { content_type: String },

    #[error("file too large: {size} bytes exceeds {limit} bytes")]
    FileTooLarge { size: u64, limit: u64 },

    #[error("gallery capacity of {max_items} items exceeded")]
    CapacityExceeded { max_items: usize },

    #[error("preview failed: {0}")]
    PreviewFailed(String),
}

impl ErrorMetadata for RejectionReason {
    fn error_code(&self) -> &'static str {
        match self {
            RejectionReason::UnsupportedType { .. } => "UNSUPPORTED_TYPE",
            RejectionReason::FileTooLarge { .. } => "FILE_TOO_LARGE",
            RejectionReason::CapacityExceeded { .. } => "CAPACITY_EXCEEDED",
            RejectionReason::PreviewFailed(_) => "PREVIEW_FAILED",
        }
    }

    fn is_recoverable(&self) -> bool {
        true
    }

    fn suggested_action(&self) -> Option<&'static str> {
        match self {
            RejectionReason::UnsupportedType { .. } => Some("Choose an image or video file"),
            RejectionReason::FileTooLarge { .. } => Some("Choose a smaller file"),
            RejectionReason::CapacityExceeded { .. } => {
                Some("Remove some media before adding more")
            }
            RejectionReason::PreviewFailed(_) => Some("Select the file again"),
        }
    }

    fn client_message(&self) -> String {
        match self {
            RejectionReason::UnsupportedType { .. } => "is not an image or video file".to_string(),
            RejectionReason::FileTooLarge { limit, .. } => {
                format!("must be smaller than {}MB", limit / 1024 / 1024)
            }
            RejectionReason::CapacityExceeded { max_items } => {
                format!("was not added. Maximum is {} per product", max_items)
            }
            RejectionReason::PreviewFailed(_) => "could not be read".to_string(),
        }
    }

    fn log_level(&self) -> LogLevel {
        match self {
            RejectionReason::PreviewFailed(_) => LogLevel::Warn,
            _ => LogLevel::Debug,
        }
    }
}
