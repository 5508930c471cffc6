//! Human-readable stage reports
//!
//! Every stage result can also be emitted as JSON; these printers are the
//! text rendering used by default.

use crate::archive::FetchedFile;
use crate::config::Config;
use crate::context::IngestSummary;
use crate::crawler::{CrawlOutcome, PageFailure};
use crate::download::DownloadReport;
use crate::index::{IndexInfo, SearchResult};
use serde::Serialize;
use std::collections::BTreeMap;

/// Serializable summary of a crawl run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CrawlReport {
    pub success: bool,
    pub total_links: usize,
    pub links_by_type: BTreeMap<String, usize>,
    pub fetches: u32,
    pub iteration_limit_reached: bool,
    pub failed_pages: Vec<PageFailure>,
}

impl CrawlReport {
    pub fn from_outcome(outcome: &CrawlOutcome) -> Self {
        let mut links_by_type = BTreeMap::new();
        for link in outcome.links.iter() {
            *links_by_type.entry(link.link_type.clone()).or_insert(0) += 1;
        }

        Self {
            success: true,
            total_links: outcome.links.len(),
            links_by_type,
            fetches: outcome.fetches,
            iteration_limit_reached: outcome.iteration_limit_reached,
            failed_pages: outcome.failed_pages.clone(),
        }
    }
}

pub fn print_crawl_report(report: &CrawlReport) {
    println!("=== Crawl ===\n");
    println!("  Links: {}", report.total_links);
    for (link_type, count) in &report.links_by_type {
        println!("    {}: {}", link_type, count);
    }
    println!("  Listing pages fetched: {}", report.fetches);

    if report.iteration_limit_reached {
        println!("  Stopped at the iteration limit with pages still queued");
    }

    if !report.failed_pages.is_empty() {
        println!("\nFailed pages ({}):", report.failed_pages.len());
        for failure in &report.failed_pages {
            println!("  - {}: {}", failure.url, failure.error);
        }
    }
}

pub fn print_download_report(report: &DownloadReport) {
    println!("=== Download ===\n");
    println!("  Total: {}", report.total);
    println!("  Succeeded: {}", report.succeeded);
    println!("  Failed: {}", report.failed);

    if !report.failures.is_empty() {
        println!("\nFailures:");
        for failure in &report.failures {
            println!("  - {}: {}", failure.url, failure.error);
        }
    }
}

pub fn print_manifest(files: &[FetchedFile]) {
    println!("=== Files ({}) ===\n", files.len());
    for file in files {
        println!("  [{}] {} ({})", file.folder, file.name, file.extension);
    }
}

pub fn print_ingest_summary(summary: &IngestSummary) {
    println!("=== Ingest ===\n");
    println!("  Files read: {}", summary.files);
    println!("  Records built: {}", summary.records);
    println!("  Skipped: {}", summary.skipped.len());
    for skipped in &summary.skipped {
        println!("    - {}: {}", skipped.path.display(), skipped.reason);
    }

    let index = &summary.index;
    println!("\n  Indexed: {}", index.accepted);
    println!("  Rejected: {}", index.rejected);
    for rejection in &index.rejection_details {
        println!(
            "    - {} ({}): {}",
            rejection.id, rejection.status, rejection.reason
        );
    }
    if let Some(error) = &index.error {
        println!("\n  Error: {}", error);
    }
}

pub fn print_search_result(result: &SearchResult) {
    println!("=== {} result(s) ===\n", result.total);
    for hit in &result.hits {
        let title = ["numero_resolución", "nombre_proyecto", "nombre_archivo"]
            .iter()
            .find_map(|field| hit.source.get(*field).and_then(|v| v.as_str()))
            .unwrap_or("");
        match hit.score {
            Some(score) => println!("  {} [{:.2}] {}", hit.id, score, title),
            None => println!("  {} {}", hit.id, title),
        }
    }

    if let Some(aggs) = result.aggregations.as_object() {
        for (name, agg) in aggs {
            let Some(buckets) = agg.get("buckets").and_then(|b| b.as_array()) else {
                continue;
            };
            println!("\n{}:", name);
            for bucket in buckets {
                let key = bucket
                    .get("key_as_string")
                    .or_else(|| bucket.get("key"))
                    .map(|k| k.as_str().map(str::to_string).unwrap_or_else(|| k.to_string()))
                    .unwrap_or_default();
                let count = bucket.get("doc_count").and_then(|c| c.as_u64()).unwrap_or(0);
                println!("  {}: {}", key, count);
            }
        }
    }
}

pub fn print_indices(indices: &[IndexInfo]) {
    println!("=== Indices ({}) ===\n", indices.len());
    for info in indices {
        println!(
            "  {:<30} {:>10} docs  {:>10}  {} / {}",
            info.name, info.doc_count, info.size, info.health, info.status
        );
    }
}

/// Prints the effective configuration, secrets omitted
pub fn print_config(config: &Config) {
    println!("=== regdoc configuration ===\n");

    println!("Crawler:");
    println!("  Seed URL: {}", config.crawler.seed_url);
    println!(
        "  Base prefix: {}",
        config
            .crawler
            .base_prefix
            .as_deref()
            .unwrap_or("(seed URL up to its last '/')")
    );
    println!("  Listing extensions: {}", config.crawler.listing_extensions.join(", "));
    println!("  Document extensions: {}", config.crawler.document_extensions.join(", "));
    println!("  Container: {}", config.crawler.container_selector);
    println!("  Max iterations: {}", config.crawler.max_iterations);
    println!("  Request timeout: {}s", config.crawler.request_timeout_secs);

    println!("\nUser Agent:\n  {}", config.user_agent.value);

    println!("\nStorage:");
    println!("  Link store: {}", config.storage.link_store_path);

    println!("\nDownload:");
    println!("  Destination: {}", config.download.destination_dir);
    println!("  Document type: {}", config.download.document_type);
    println!("  Timeout: {}s", config.download.timeout_secs);

    println!("\nIngest:");
    println!("  Min text length: {}", config.ingest.min_text_length);
    println!("  OCR: {}", if config.ingest.ocr_enabled { "enabled" } else { "disabled" });
    println!("  OCR threshold: {}", config.ingest.ocr_threshold);
    println!("  OCR language: {}", config.ingest.ocr_language);
    println!("  Archive extensions: {}", config.ingest.archive_extensions.join(", "));
    println!("  Enrichment: {:?}", config.ingest.enrichment);

    println!("\nSearch:");
    println!("  URL: {}", config.search.url);
    println!("  Index: {}", config.search.index);
    let auth = if config.search.api_key.is_some() {
        "api key"
    } else if config.search.username.is_some() {
        "basic"
    } else {
        "environment / none"
    };
    println!("  Auth: {}", auth);
    println!("  Bulk chunk size: {}", config.search.bulk_chunk_size);
}
