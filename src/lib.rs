//! regdoc: a crawl-and-ingest pipeline for regulatory documents
//!
//! This crate discovers downloadable documents on paginated listing pages,
//! downloads them, normalizes heterogeneous source files into search
//! documents and bulk-loads them into a search engine exactly once.

pub mod archive;
pub mod config;
pub mod context;
pub mod crawler;
pub mod download;
pub mod index;
pub mod ingest;
pub mod output;
pub mod storage;
pub mod url;

use thiserror::Error;

/// Main error type for regdoc operations
#[derive(Debug, Error)]
pub enum RegdocError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Link store error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("Fetch error: {0}")]
    Fetch(#[from] crawler::FetchError),

    #[error("Archive error: {0}")]
    Archive(#[from] archive::ArchiveError),

    #[error("Extraction error: {0}")]
    Extract(#[from] ingest::ExtractError),

    #[error("Search engine error: {0}")]
    Search(#[from] index::SearchError),

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

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

    #[error("Invalid CSS selector: {0}")]
    InvalidSelector(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Invalid extension token: '{0}'")]
    InvalidExtension(String),
}

/// Result type alias for regdoc operations
pub type Result<T> = std::result::Result<T, RegdocError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use context::AppContext;
pub use storage::{Link, LinkSet};
