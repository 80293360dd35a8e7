//! kb-mirror: mirrors a hierarchical knowledge base into a local Markdown tree
//!
//! This crate discovers article and category pages of a single support site,
//! converts every article to Markdown, places it in a category directory and
//! rehosts its images so the resulting tree can be browsed offline.

pub mod classify;
pub mod config;
pub mod convert;
pub mod crawler;
pub mod extract;
pub mod output;
pub mod state;
pub mod url;

use thiserror::Error;

/// Main error type for run-level kb-mirror operations
#[derive(Debug, Error)]
pub enum MirrorError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("URL error: {0}")]
    Url(#[from] UrlError),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Site map error: {0}")]
    SiteMap(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing domain in URL")]
    MissingDomain,

    /// Outside the target domain or matching an exclusion pattern.
    /// Dropped silently by callers, never counted as a failure.
    #[error("URL out of scope: {0}")]
    OutOfScope(String),
}

/// Page navigation failures reported by a browsing context
#[derive(Debug, Error)]
pub enum NavigationError {
    #[error("Navigation timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("HTTP status {0}")]
    Status(u16),

    /// The response was not an HTML document
    #[error("Unexpected content type: {0}")]
    ContentMismatch(String),
}

/// Per-article pipeline failures
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Navigation failed: {0}")]
    Navigation(#[from] NavigationError),

    #[error("No content found on page")]
    Extraction,

    #[error("Markdown conversion produced no output")]
    Conversion,

    #[error("Failed to write document: {0}")]
    Persistence(#[from] std::io::Error),
}

impl PipelineError {
    /// Persistence failures are recorded as failed without another attempt
    pub fn is_retryable(&self) -> bool {
        !matches!(self, PipelineError::Persistence(_))
    }
}

/// Image download failures; logged and skipped
#[derive(Debug, Error)]
pub enum ImageError {
    #[error("HTTP status {0}")]
    Http(u16),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for run-level operations
pub type Result<T> = std::result::Result<T, MirrorError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use classify::classify;
pub use config::Config;
pub use crawler::{Coordinator, ScrapeOutcome, SiteMap};
pub use state::ArticleState;
pub use url::{is_in_scope, normalize, NormalizedUrl};
