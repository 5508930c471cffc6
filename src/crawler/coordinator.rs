//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the breadth-first traversal of listing pages:
//! - Loading (or seeding) the link set
//! - Managing the frontier of listing pages
//! - Coordinating fetching and link extraction
//! - Persisting the link set when traversal ends

use crate::config::CrawlerConfig;
use crate::crawler::fetcher::fetch_page;
use crate::crawler::frontier::Frontier;
use crate::crawler::parser::LinkExtractor;
use crate::storage::{LinkSet, LinkStore};
use crate::url::{default_base_prefix, normalize_extensions, parse_seed_url, LinkFilter};
use crate::{ConfigError, Result};
use reqwest::Client;
use serde::Serialize;
use url::Url;

/// A listing page that could not be fetched
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageFailure {
    pub url: String,
    pub error: String,
}

/// Result of one crawl run
#[derive(Debug, Clone)]
pub struct CrawlOutcome {
    /// Every link known after the run, persisted ones included
    pub links: LinkSet,

    /// Listing pages fetched from the frontier (the seed page is not counted)
    pub fetches: u32,

    /// True when the iteration cap stopped the run with pages still queued
    pub iteration_limit_reached: bool,

    /// Pages skipped because their fetch failed
    pub failed_pages: Vec<PageFailure>,
}

/// Static crawl settings, independent of a single run's arguments
#[derive(Debug, Clone)]
pub struct CrawlSettings {
    pub container_selector: String,
    pub listing_extensions: Vec<String>,
    pub base_prefix: Option<String>,
}

impl CrawlSettings {
    pub fn from_config(config: &CrawlerConfig) -> Result<Self> {
        Ok(Self {
            container_selector: config.container_selector.clone(),
            listing_extensions: normalize_extensions(&config.listing_extensions)?,
            base_prefix: config.base_prefix.clone(),
        })
    }
}

/// Main crawler structure
pub struct Crawler<'a> {
    client: &'a Client,
    store: &'a dyn LinkStore,
    settings: CrawlSettings,
}

impl<'a> Crawler<'a> {
    /// Creates a crawler
    ///
    /// # Arguments
    ///
    /// * `client` - HTTP client used for listing pages
    /// * `store` - Where the link set is loaded from and saved to
    /// * `settings` - Container selector, listing types and base prefix
    pub fn new(client: &'a Client, store: &'a dyn LinkStore, settings: CrawlSettings) -> Self {
        Self {
            client,
            store,
            settings,
        }
    }

    /// Runs a crawl
    ///
    /// A non-empty persisted link set replaces the seed fetch, which makes
    /// repeated runs resume instead of starting over. With `max_iterations`
    /// of zero no request is made at all.
    ///
    /// # Arguments
    ///
    /// * `seed_url` - Absolute http(s) URL of the first listing page
    /// * `extensions` - Link types of interest, listing types included
    /// * `max_iterations` - Maximum listing pages fetched from the frontier
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlOutcome)` - The accumulated link set, already persisted
    /// * `Err(RegdocError)` - Invalid arguments or the link set could not be saved
    pub async fn crawl(
        &self,
        seed_url: &str,
        extensions: &[String],
        max_iterations: u32,
    ) -> Result<CrawlOutcome> {
        let seed = parse_seed_url(seed_url)?;
        let extensions = normalize_extensions(extensions)?;
        if extensions.is_empty() {
            return Err(ConfigError::Validation(
                "at least one extension of interest is required".to_string(),
            )
            .into());
        }

        let base_prefix = self
            .settings
            .base_prefix
            .clone()
            .unwrap_or_else(|| default_base_prefix(&seed));
        let extractor = LinkExtractor::new(
            &self.settings.container_selector,
            LinkFilter::new(extensions, base_prefix.clone()),
        )?;

        let mut links = self.store.load()?;
        let loaded = links.len();
        links.retain(|link| extractor.filter().in_scope(&link.url));
        if links.len() < loaded {
            tracing::warn!(
                "Dropped {} persisted link(s) outside {}",
                loaded - links.len(),
                base_prefix
            );
        }

        let mut failed_pages = Vec::new();
        let mut frontier = Frontier::new();

        if !links.is_empty() {
            tracing::info!("Resuming from {} persisted links", links.len());
        } else if max_iterations == 0 {
            tracing::info!("No persisted links and max iterations is 0, nothing to do");
        } else {
            tracing::info!("Fetching seed page {}", seed);
            frontier.mark_visited(seed.as_str());
            match self.fetch_links(&extractor, &seed).await {
                Ok(found) => {
                    for link in found {
                        links.insert(link);
                    }
                }
                Err(failure) => failed_pages.push(failure),
            }
        }

        for link in links.iter() {
            if self.is_listing(&link.link_type) {
                frontier.push(link.url.clone());
            }
        }

        let mut fetches: u32 = 0;
        while fetches < max_iterations {
            let Some(url) = frontier.pop() else {
                tracing::info!("Frontier is empty, crawl complete");
                break;
            };
            fetches += 1;

            let page_url = match Url::parse(&url) {
                Ok(u) => u,
                Err(e) => {
                    tracing::warn!("Skipping unparseable listing URL {}: {}", url, e);
                    failed_pages.push(PageFailure {
                        url,
                        error: e.to_string(),
                    });
                    continue;
                }
            };

            let found = match self.fetch_links(&extractor, &page_url).await {
                Ok(found) => found,
                Err(failure) => {
                    failed_pages.push(failure);
                    continue;
                }
            };

            let mut new_links = 0;
            for link in found {
                let listing = self.is_listing(&link.link_type);
                let link_url = link.url.clone();
                if links.insert(link) {
                    new_links += 1;
                    if listing && !frontier.is_visited(&link_url) {
                        frontier.push(link_url);
                    }
                }
            }
            tracing::debug!("{}: {} new link(s)", page_url, new_links);

            if fetches % 10 == 0 {
                tracing::info!(
                    "Progress: {} pages fetched, {} in frontier, {} links",
                    fetches,
                    frontier.len(),
                    links.len()
                );
            }
        }

        let iteration_limit_reached =
            max_iterations > 0 && fetches >= max_iterations && !frontier.is_empty();
        if iteration_limit_reached {
            tracing::warn!(
                "Iteration limit of {} reached with {} listing page(s) still queued",
                max_iterations,
                frontier.len()
            );
        }

        self.store.save(&links)?;

        tracing::info!(
            "Crawl finished: {} links after {} fetches ({} failed)",
            links.len(),
            fetches,
            failed_pages.len()
        );

        Ok(CrawlOutcome {
            links,
            fetches,
            iteration_limit_reached,
            failed_pages,
        })
    }

    fn is_listing(&self, link_type: &str) -> bool {
        self.settings
            .listing_extensions
            .iter()
            .any(|ext| ext == link_type)
    }

    async fn fetch_links(
        &self,
        extractor: &LinkExtractor,
        page_url: &Url,
    ) -> std::result::Result<Vec<crate::storage::Link>, PageFailure> {
        match fetch_page(self.client, page_url.as_str()).await {
            Ok(html) => Ok(extractor.extract(&html, page_url)),
            Err(e) => {
                tracing::warn!("Failed to fetch {}: {}", page_url, e);
                Err(PageFailure {
                    url: page_url.to_string(),
                    error: e.to_string(),
                })
            }
        }
    }
}
