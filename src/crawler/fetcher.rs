//! HTTP fetcher implementation
//!
//! This module handles all scraping requests, including:
//! - Building the HTTP client with the configured browser user agent
//! - GET requests for listing pages
//! - Streaming document downloads to disk
//! - Error classification

use crate::config::UserAgentConfig;
use reqwest::Client;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use tokio::io::AsyncWriteExt;

/// Why a single request failed
///
/// Every variant is a per-item failure: callers skip or record the item and
/// move on.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Non-2xx response
    #[error("{status} {reason}")]
    Status { status: u16, reason: String },

    #[error("Request timeout")]
    Timeout,

    #[error("Connection failed: {0}")]
    Connect(String),

    #[error("Request failed: {0}")]
    Network(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            FetchError::Timeout
        } else if e.is_connect() {
            FetchError::Connect(e.to_string())
        } else if let Some(status) = e.status() {
            FetchError::Status {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("").to_string(),
            }
        } else {
            FetchError::Network(e.to_string())
        }
    }
}

/// Builds the scraping HTTP client
///
/// # Arguments
///
/// * `config` - The user agent configuration
/// * `timeout` - Default timeout for every request made with this client
///
/// # Example
///
/// ```no_run
/// use regdoc::config::UserAgentConfig;
/// use regdoc::crawler::build_http_client;
/// use std::time::Duration;
///
/// let client = build_http_client(&UserAgentConfig::default(), Duration::from_secs(30)).unwrap();
/// ```
pub fn build_http_client(
    config: &UserAgentConfig,
    timeout: Duration,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.value.clone())
        .timeout(timeout)
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches an HTML page and returns its body
///
/// A non-2xx status, a network failure, a timeout or an undecodable body is
/// reported as a `FetchError`.
pub async fn fetch_page(client: &Client, url: &str) -> Result<String, FetchError> {
    let response = client.get(url).send().await?;
    let status = response.status();

    if !status.is_success() {
        return Err(FetchError::Status {
            status: status.as_u16(),
            reason: status.canonical_reason().unwrap_or("").to_string(),
        });
    }

    Ok(response.text().await?)
}

/// Streams a URL to a file, returning the number of bytes written
///
/// The file is created (or truncated) only after a successful status; a
/// failure while streaming removes the partial file.
pub async fn download_to_file(
    client: &Client,
    url: &str,
    path: &Path,
    timeout: Duration,
) -> Result<u64, FetchError> {
    let mut response = client.get(url).timeout(timeout).send().await?;
    let status = response.status();

    if !status.is_success() {
        return Err(FetchError::Status {
            status: status.as_u16(),
            reason: status.canonical_reason().unwrap_or("").to_string(),
        });
    }

    let mut file = tokio::fs::File::create(path).await?;
    let mut written: u64 = 0;

    let result: Result<(), FetchError> = async {
        while let Some(chunk) = response.chunk().await? {
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }
        file.flush().await?;
        Ok(())
    }
    .await;

    if let Err(e) = result {
        drop(file);
        if let Err(remove_err) = tokio::fs::remove_file(path).await {
            tracing::debug!("Could not remove partial file {}: {}", path.display(), remove_err);
        }
        return Err(e);
    }

    Ok(written)
}
