use serde::{Deserialize, Serialize};

/// Main configuration structure for regdoc
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent", default)]
    pub user_agent: UserAgentConfig,
    pub storage: StorageConfig,
    pub download: DownloadConfig,
    #[serde(default)]
    pub ingest: IngestConfig,
    pub search: SearchConfig,
}

/// Listing-page traversal configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CrawlerConfig {
    /// First listing page of the crawl
    #[serde(rename = "seed-url")]
    pub seed_url: String,

    /// Every accepted link must start with this prefix.
    /// Defaults to the seed URL up to its last '/'.
    #[serde(rename = "base-prefix", default)]
    pub base_prefix: Option<String>,

    /// Extensions of pages that are followed (e.g. "aspx")
    #[serde(rename = "listing-extensions")]
    pub listing_extensions: Vec<String>,

    /// Extensions of documents that are collected (e.g. "pdf")
    #[serde(rename = "document-extensions")]
    pub document_extensions: Vec<String>,

    /// CSS selector of the element whose anchors are considered
    #[serde(rename = "container-selector", default = "default_container_selector")]
    pub container_selector: String,

    /// Maximum number of listing pages fetched from the frontier
    #[serde(rename = "max-iterations", default = "default_max_iterations")]
    pub max_iterations: u32,

    /// Timeout for a single listing page request (seconds)
    #[serde(rename = "request-timeout-secs", default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

/// User agent sent with every scraping request
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UserAgentConfig {
    pub value: String,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            value: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

/// Browser user agent used when none is configured
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Link store configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    /// Path to the JSON link set file
    #[serde(rename = "link-store-path")]
    pub link_store_path: String,
}

/// Document download configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DownloadConfig {
    /// Directory the documents are downloaded into (wiped before each run)
    #[serde(rename = "destination-dir")]
    pub destination_dir: String,

    /// Link type that is downloaded
    #[serde(rename = "document-type", default = "default_document_type")]
    pub document_type: String,

    /// Timeout for a single download (seconds)
    #[serde(rename = "timeout-secs", default = "default_download_timeout")]
    pub timeout_secs: u64,
}

/// Normalization configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct IngestConfig {
    /// Texts shorter than this (after trimming) are skipped
    #[serde(rename = "min-text-length", default = "default_min_text_length")]
    pub min_text_length: usize,

    /// Extraction stops at the first strategy yielding at least this many characters
    #[serde(rename = "ocr-threshold", default = "default_ocr_threshold")]
    pub ocr_threshold: usize,

    #[serde(rename = "ocr-enabled", default = "default_true")]
    pub ocr_enabled: bool,

    /// Tesseract language code
    #[serde(rename = "ocr-language", default = "default_ocr_language")]
    pub ocr_language: String,

    /// Archive entries outside this list are skipped on extraction
    #[serde(rename = "archive-extensions", default = "default_archive_extensions")]
    pub archive_extensions: Vec<String>,

    #[serde(default)]
    pub enrichment: EnrichmentKind,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            min_text_length: default_min_text_length(),
            ocr_threshold: default_ocr_threshold(),
            ocr_enabled: true,
            ocr_language: default_ocr_language(),
            archive_extensions: default_archive_extensions(),
            enrichment: EnrichmentKind::default(),
        }
    }
}

/// Which enrichment hook runs over extracted text
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum EnrichmentKind {
    #[default]
    None,
    TermFrequency,
}

/// Search engine connection configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SearchConfig {
    /// Base URL of the Elasticsearch cluster
    pub url: String,

    /// Default index for ingestion and queries
    pub index: String,

    /// API key; ELASTIC_API_KEY is used when absent
    #[serde(rename = "api-key", default, skip_serializing)]
    pub api_key: Option<String>,

    #[serde(default)]
    pub username: Option<String>,

    #[serde(default, skip_serializing)]
    pub password: Option<String>,

    #[serde(rename = "timeout-secs", default = "default_search_timeout")]
    pub timeout_secs: u64,

    /// Number of documents per bulk request
    #[serde(rename = "bulk-chunk-size", default = "default_bulk_chunk_size")]
    pub bulk_chunk_size: usize,
}

fn default_container_selector() -> String {
    "div.containerblanco".to_string()
}

fn default_max_iterations() -> u32 {
    50
}

fn default_request_timeout() -> u64 {
    30
}

fn default_document_type() -> String {
    "pdf".to_string()
}

fn default_download_timeout() -> u64 {
    60
}

fn default_min_text_length() -> usize {
    50
}

fn default_ocr_threshold() -> usize {
    100
}

fn default_true() -> bool {
    true
}

fn default_ocr_language() -> String {
    "spa".to_string()
}

fn default_archive_extensions() -> Vec<String> {
    vec!["json".to_string(), "txt".to_string(), "pdf".to_string()]
}

fn default_search_timeout() -> u64 {
    30
}

fn default_bulk_chunk_size() -> usize {
    500
}
