//! Crawler module for listing page traversal
//!
//! This module contains the link discovery logic, including:
//! - HTTP fetching with the configured user agent
//! - Container-scoped link extraction and classification
//! - The FIFO frontier of listing pages
//! - Overall crawl coordination and link set persistence

mod coordinator;
mod fetcher;
mod frontier;
mod parser;

pub use coordinator::{CrawlOutcome, CrawlSettings, Crawler, PageFailure};
pub use fetcher::{build_http_client, download_to_file, fetch_page, FetchError};
pub use frontier::Frontier;
pub use parser::LinkExtractor;
