//! Configuration module
//!
//! This module provides configuration structures for the API client and the
//! gallery manager. Values come from the environment (and an optional `.env`
//! file) with defaults matching the storefront's upload rules.

use std::env;

use crate::error::{AppError, Result};

// Common constants
const MIB: u64 = 1024 * 1024;
const MAX_ITEMS: usize = 5;
const MAX_IMAGE_SIZE_MB: u64 = 5;
const MAX_VIDEO_SIZE_MB: u64 = 50;
/// Default request timeout for the API client.
pub const HTTP_TIMEOUT_SECS: u64 = 60;
const DEFAULT_API_URL: &str = "http://localhost:8000/api";

/// Limits enforced by the gallery manager on staged files.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GalleryConfig {
    /// Hard cap on persisted + staged items.
    pub max_items: usize,
    pub max_image_bytes: u64,
    pub max_video_bytes: u64,
    /// MIME prefixes a staged file must start with (e.g. `image/`).
    pub accepted_prefixes: Vec<String>,
}

impl Default for GalleryConfig {
    fn default() -> Self {
        Self {
            max_items: MAX_ITEMS,
            max_image_bytes: MAX_IMAGE_SIZE_MB * MIB,
            max_video_bytes: MAX_VIDEO_SIZE_MB * MIB,
            accepted_prefixes: vec!["image/".to_string(), "video/".to_string()],
        }
    }
}

/// Convert a megabyte limit to bytes, rejecting values that overflow `u64`.
fn megabytes_to_bytes(var: &str, megabytes: u64) -> Result<u64> {
    megabytes
        .checked_mul(MIB)
        .ok_or_else(|| AppError::Config(format!("{} is too large: {} MB", var, megabytes)))
}

impl GalleryConfig {
    pub fn from_env() -> Result<Self> {
        let max_items = env::var("GALLERY_MAX_ITEMS")
            .unwrap_or_else(|_| MAX_ITEMS.to_string())
            .parse::<usize>()
            .unwrap_or(MAX_ITEMS);

        let max_image_size_mb = env::var("GALLERY_MAX_IMAGE_SIZE_MB")
            .unwrap_or_else(|_| MAX_IMAGE_SIZE_MB.to_string())
            .parse::<u64>()
            .unwrap_or(MAX_IMAGE_SIZE_MB);

        let max_video_size_mb = env::var("GALLERY_MAX_VIDEO_SIZE_MB")
            .unwrap_or_else(|_| MAX_VIDEO_SIZE_MB.to_string())
            .parse::<u64>()
            .unwrap_or(MAX_VIDEO_SIZE_MB);

        let accepted_prefixes = env::var("GALLERY_ACCEPTED_PREFIXES")
            .unwrap_or_else(|_| "image/,video/".to_string())
            .split(',')
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty())
            .collect();

        let config = Self {
            max_items,
            max_image_bytes: megabytes_to_bytes("GALLERY_MAX_IMAGE_SIZE_MB", max_image_size_mb)?,
            max_video_bytes: megabytes_to_bytes("GALLERY_MAX_VIDEO_SIZE_MB", max_video_size_mb)?,
            accepted_prefixes,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_items == 0 {
            return Err(AppError::Config("GALLERY_MAX_ITEMS must be at least 1".to_string()));
        }

        if self.max_image_bytes == 0 || self.max_video_bytes == 0 {
            return Err(AppError::Config(
                "GALLERY_MAX_IMAGE_SIZE_MB and GALLERY_MAX_VIDEO_SIZE_MB must be greater than 0"
                    .to_string(),
            ));
        }

        if self.accepted_prefixes.is_empty() {
            return Err(AppError::Config(
                "GALLERY_ACCEPTED_PREFIXES must list at least one MIME prefix".to_string(),
            ));
        }

        Ok(())
    }

    /// Whether `content_type` starts with one of the accepted prefixes.
    pub fn accepts(&self, content_type: &str) -> bool {
        let content_type = content_type.to_lowercase();
        self.accepted_prefixes
            .iter()
            .any(|prefix| content_type.starts_with(prefix.as_str()))
    }
}

/// Remote API connection settings.
#[derive(Clone, Debug)]
pub struct ApiConfig {
    pub base_url: String,
    /// Bearer token for shop owners. Guests browse without one.
    pub access_token: Option<String>,
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            access_token: None,
            timeout_secs: HTTP_TIMEOUT_SECS,
        }
    }
}

impl ApiConfig {
    pub fn from_env() -> Result<Self> {
        let base_url = env::var("VITRINE_API_URL")
            .or_else(|_| env::var("API_URL"))
            .unwrap_or_else(|_| DEFAULT_API_URL.to_string());

        let access_token = env::var("VITRINE_ACCESS_TOKEN")
            .or_else(|_| env::var("ACCESS_TOKEN"))
            .ok()
            .filter(|t| !t.trim().is_empty());

        let timeout_secs = env::var("VITRINE_HTTP_TIMEOUT_SECS")
            .unwrap_or_else(|_| HTTP_TIMEOUT_SECS.to_string())
            .parse()
            .unwrap_or(HTTP_TIMEOUT_SECS);

        let config = Self {
            base_url,
            access_token,
            timeout_secs,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(AppError::Config(
                "VITRINE_API_URL must be an http:// or https:// URL".to_string(),
            ));
        }

        if self.timeout_secs == 0 {
            return Err(AppError::Config(
                "VITRINE_HTTP_TIMEOUT_SECS must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config {
    pub api: ApiConfig,
    pub gallery: GalleryConfig,
    pub environment: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string());

        let config = Config {
            api: ApiConfig::from_env()?,
            gallery: GalleryConfig::from_env()?,
            environment,
        };

        tracing::debug!(
            base_url = %config.api.base_url,
            max_items = config.gallery.max_items,
            authenticated = config.api.access_token.is_some(),
            "Configuration loaded"
        );

        Ok(config)
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    pub fn validate(&self) -> Result<()> {
        self.api.validate()?;
        self.gallery.validate()?;

        if self.is_production() && self.api.base_url.starts_with("http://") {
            return Err(AppError::Config(
                "VITRINE_API_URL must use https:// in production".to_string(),
            ));
        }

        Ok(())
    }
}
