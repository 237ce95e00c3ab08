//! Track-Harvest: an audio link harvester for a single web page
//!
//! This crate locates downloadable `.mp3` files referenced on one HTML page,
//! totals their size with metadata-only requests, and downloads them under
//! sanitized file names.

pub mod config;
pub mod harvest;
pub mod output;
pub mod url;

use thiserror::Error;

/// Main error type for Track-Harvest sessions
///
/// Only the initial page fetch and session setup produce these. Failures of a
/// single item inside the probe or retrieval loops are reported as [`ItemError`]
/// and never escape the loop.
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Failed to retrieve the page {url}: status code {status}")]
    Fetch { url: String, status: u16 },

    #[error("Network error for {url}: {source}")]
    Network { url: String, source: reqwest::Error },

    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),

    #[error("URL error: {0}")]
    Url(#[from] UrlError),
}

/// Failure of a single probe or retrieval item
#[derive(Debug, Error)]
pub enum ItemError {
    #[error("status code {0}")]
    Status(u16),

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("response carried no Content-Length header")]
    MissingLength,

    #[error("failed to write file: {0}")]
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
    #[error("Page URL has no directory portion: {0}")]
    NoDirectory(String),
}

/// Result type alias for Track-Harvest operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use harvest::{Harvester, LinkRegistry, StopSignal};
pub use output::{ProgressEvent, ProgressSink, RetrievalOutcome, RetrievalReport};
pub use crate::url::{page_directory, resolve_resource_url};
