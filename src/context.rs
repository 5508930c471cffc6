//! Application context and pipeline stages
//!
//! `AppContext` owns the configuration, the shared HTTP client and the search
//! backend, and runs each pipeline stage against them.

use crate::archive::{self, clear_directory, FetchedFile};
use crate::config::Config;
use crate::crawler::{build_http_client, CrawlOutcome, CrawlSettings, Crawler};
use crate::download::{DownloadReport, Downloader};
use crate::index::{index_batch, regulatory_mapping, ElasticClient, IndexReport, SearchBackend};
use crate::ingest::{IngestMethod, Normalizer, Skipped};
use crate::storage::{JsonLinkStore, LinkStore};
use crate::Result;
use reqwest::Client;
use serde::Serialize;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

/// Overrides applied to a crawl run
#[derive(Debug, Clone, Default)]
pub struct CrawlOptions {
    pub seed_url: Option<String>,
    pub max_iterations: Option<u32>,
    /// Discard the persisted link set before crawling
    pub fresh: bool,
}

/// Outcome of the ingest stage
#[derive(Debug, Clone, Serialize)]
pub struct IngestSummary {
    pub files: usize,
    pub records: usize,
    pub skipped: Vec<Skipped>,
    pub index: IndexReport,
}

pub struct AppContext {
    config: Config,
    http: Client,
    search: Arc<dyn SearchBackend>,
}

impl AppContext {
    /// Builds the context with an Elasticsearch backend
    pub fn new(config: Config) -> Result<Self> {
        let http = build_http_client(
            &config.user_agent,
            Duration::from_secs(config.crawler.request_timeout_secs),
        )?;
        let search: Arc<dyn SearchBackend> = Arc::new(ElasticClient::new(
            Client::builder()
                .timeout(Duration::from_secs(config.search.timeout_secs))
                .build()?,
            &config.search,
        ));
        Ok(Self {
            config,
            http,
            search,
        })
    }

    /// Builds the context around an existing search backend
    pub fn with_search_backend(config: Config, search: Arc<dyn SearchBackend>) -> Result<Self> {
        let http = build_http_client(
            &config.user_agent,
            Duration::from_secs(config.crawler.request_timeout_secs),
        )?;
        Ok(Self {
            config,
            http,
            search,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn search(&self) -> &dyn SearchBackend {
        self.search.as_ref()
    }

    pub fn link_store(&self) -> JsonLinkStore {
        JsonLinkStore::new(&self.config.storage.link_store_path)
    }

    pub fn destination_dir(&self) -> PathBuf {
        PathBuf::from(&self.config.download.destination_dir)
    }

    /// Document and listing extensions, in that order
    pub fn extensions_of_interest(&self) -> Vec<String> {
        let crawler = &self.config.crawler;
        crawler
            .document_extensions
            .iter()
            .chain(crawler.listing_extensions.iter())
            .cloned()
            .collect()
    }

    /// Crawls the listing pages and persists the link set
    pub async fn crawl(&self, options: &CrawlOptions) -> Result<CrawlOutcome> {
        let store = self.link_store();
        if options.fresh {
            tracing::info!("Discarding persisted links at {}", store.path().display());
            store.clear()?;
        }

        let seed = options
            .seed_url
            .as_deref()
            .unwrap_or(&self.config.crawler.seed_url);
        let max_iterations = options
            .max_iterations
            .unwrap_or(self.config.crawler.max_iterations);

        let crawler = Crawler::new(
            &self.http,
            &store,
            CrawlSettings::from_config(&self.config.crawler)?,
        );
        crawler
            .crawl(seed, &self.extensions_of_interest(), max_iterations)
            .await
    }

    /// Downloads the documents of the persisted link set
    ///
    /// When the link store lives inside the destination directory it is
    /// written back after the wipe.
    pub async fn download(&self) -> Result<DownloadReport> {
        let store = self.link_store();
        let links = store.load()?;
        let destination = self.destination_dir();

        let report = Downloader::from_config(&self.http, &self.config.download)
            .download(&links, &destination)
            .await?;

        if report.total > 0 && lies_within(store.path(), &destination) {
            tracing::info!("Restoring link store inside {}", destination.display());
            store.save(&links)?;
        }
        Ok(report)
    }

    /// Crawls, then downloads what was found
    pub async fn scrape(&self, options: &CrawlOptions) -> Result<(CrawlOutcome, DownloadReport)> {
        let outcome = self.crawl(options).await?;
        let report = self.download().await?;
        Ok((outcome, report))
    }

    /// Clears `destination` and extracts the allowed entries of a ZIP into it
    pub fn unpack(&self, zip_path: &Path, destination: &Path) -> Result<Vec<FetchedFile>> {
        clear_directory(destination)?;
        let files = archive::unpack_archive(
            zip_path,
            destination,
            &self.config.ingest.archive_extensions,
        )?;
        Ok(files)
    }

    /// Normalizes the files of a directory and bulk-indexes the records
    ///
    /// # Arguments
    ///
    /// * `dir` - Directory to read, recursively
    /// * `method` - `Json` reads `.json` files, `Text` reads `.pdf` and `.txt`
    /// * `index` - Target index
    pub async fn ingest(
        &self,
        dir: &Path,
        method: IngestMethod,
        index: &str,
    ) -> Result<IngestSummary> {
        let extensions: Vec<String> = match method {
            IngestMethod::Json => vec!["json".to_string()],
            IngestMethod::Text => vec!["pdf".to_string(), "txt".to_string()],
        };
        let files = archive::list_files(dir, &extensions)?;
        tracing::info!("Found {} file(s) to ingest in {}", files.len(), dir.display());

        let outcome = Normalizer::from_config(&self.config.ingest).normalize(&files, method);
        let report = index_batch(
            self.search(),
            &outcome.records,
            index,
            self.config.search.bulk_chunk_size,
        )
        .await;

        Ok(IngestSummary {
            files: files.len(),
            records: outcome.records.len(),
            skipped: outcome.skipped,
            index: report,
        })
    }

    /// Creates an index with the regulatory mapping; false if it already existed
    pub async fn create_index(&self, index: &str) -> Result<bool> {
        Ok(self.search.create_index(index, &regulatory_mapping()).await?)
    }
}

/// True when `path` is `dir` or below it, comparing absolute, lexically
/// normalized forms so `./data/x` and `data/x` agree
fn lies_within(path: &Path, dir: &Path) -> bool {
    normalize_lexically(path).starts_with(normalize_lexically(dir))
}

fn normalize_lexically(path: &Path) -> PathBuf {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .map(|cwd| cwd.join(path))
            .unwrap_or_else(|_| path.to_path_buf())
    };

    let mut normalized = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}
