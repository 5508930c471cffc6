//! Output module for stage reports
//!
//! This module handles:
//! - Text rendering of crawl, download, ingest, index and search results
//! - JSON emission of the same reports

mod report;

pub use report::{
    print_config, print_crawl_report, print_download_report, print_indices,
    print_ingest_summary, print_manifest, print_search_result, CrawlReport,
};

use serde::Serialize;

/// Prints any report as pretty JSON on stdout
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), serde_json::Error> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
