//! Configuration module for regdoc
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use regdoc::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("regdoc.toml")).unwrap();
//! println!("Crawl budget: {}", config.crawler.max_iterations);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, CrawlerConfig, DownloadConfig, EnrichmentKind, IngestConfig, SearchConfig,
    StorageConfig, UserAgentConfig, DEFAULT_USER_AGENT,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
