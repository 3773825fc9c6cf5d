//! Vitrine Core Library
//!
//! This crate provides the domain models, error types and configuration
//! shared by the gallery manager, the API client and the CLI.

pub mod config;
pub mod error;
pub mod models;

// Re-export commonly used types
pub use config::{ApiConfig, Config, GalleryConfig, HTTP_TIMEOUT_SECS};
pub use error::{AppError, ErrorMetadata, LogLevel, RejectionReason, Result};
pub use models::{MediaCursor, MediaId, MediaKind, PersistedMedia, Product};
