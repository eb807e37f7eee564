//! GTM-Probe: Google Tag Manager container detection
//!
//! This crate fetches a web page, looks for an embedded Google Tag Manager
//! container and reports whether that container is loaded through the site's
//! own ("proxified") domain rather than Google's. Work is accepted as jobs and
//! drained by a single worker so that slow upstream fetches never block the
//! caller.

pub mod analysis;
pub mod config;
pub mod gateway;
pub mod pipeline;
pub mod state;
pub mod storage;
pub mod url;

use thiserror::Error;

/// Main error type for GTM-Probe operations
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("Analysis error: {0}")]
    Analysis(#[from] AnalysisError),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Server error: {0}")]
    Server(String),
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

    #[error("Invalid bind address: {0}")]
    InvalidAddress(String),
}

/// Errors raised while retrieving a page
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("Connection failed for {url}: {message}")]
    Connect { url: String, message: String },

    #[error("Unsupported URL scheme: {scheme}")]
    UnsupportedScheme { scheme: String },

    #[error("Invalid URL {url}: {source}")]
    InvalidUrl {
        url: String,
        source: ::url::ParseError,
    },

    #[error("Failed to read response body from {url}: {source}")]
    Body { url: String, source: reqwest::Error },

    #[error("HTTP error for {url}: {source}")]
    Request { url: String, source: reqwest::Error },
}

/// Errors raised by the GTM analyzer
///
/// Malformed fragments inside the page are not errors; only a page URL the
/// analyzer cannot derive a hostname from is.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("Invalid page URL {url}: {source}")]
    InvalidUrl {
        url: String,
        source: ::url::ParseError,
    },

    #[error("Page URL has no host: {0}")]
    MissingHost(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("URL is required")]
    Missing,

    #[error("Failed to parse URL: {0}")]
    Parse(#[from] ::url::ParseError),

    #[error("Missing host in URL")]
    MissingHost,
}

/// Result type alias for GTM-Probe operations
pub type Result<T> = std::result::Result<T, ProbeError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

/// Result type alias for fetch operations
pub type FetchResult<T> = std::result::Result<T, FetchError>;

// Re-export commonly used types
pub use analysis::{AnalysisResult, Analyzer};
pub use config::Config;
pub use pipeline::{HttpFetcher, PageFetcher, Scheduler};
pub use state::{JobId, JobRecord, JobState};
pub use storage::{JobStore, MemoryJobStore};
pub use url::{extract_hostname, main_domain, parse_target_url};
