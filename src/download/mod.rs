//! Document downloader
//!
//! Downloads the document links of a link set into a destination directory
//! that belongs to the current run: its previous content is wiped first.

use crate::archive::clear_directory;
use crate::config::DownloadConfig;
use crate::crawler::download_to_file;
use crate::storage::LinkSet;
use crate::url::file_name_from_url;
use crate::Result;
use reqwest::Client;
use serde::Serialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// A download that did not produce a file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DownloadFailure {
    pub url: String,
    pub error: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DownloadOutcome {
    Success,
    Error,
}

/// Per-link record of a download attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DownloadedFile {
    pub url: String,
    pub local_path: PathBuf,
    pub outcome: DownloadOutcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_detail: Option<String>,
}

/// Summary of a download batch
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DownloadReport {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub failures: Vec<DownloadFailure>,
    pub files: Vec<DownloadedFile>,
}

impl DownloadReport {
    /// Local paths of the successful downloads, in link order
    pub fn downloaded_paths(&self) -> impl Iterator<Item = &Path> {
        self.files
            .iter()
            .filter(|f| f.outcome == DownloadOutcome::Success)
            .map(|f| f.local_path.as_path())
    }
}

/// Sequential document downloader
pub struct Downloader<'a> {
    client: &'a Client,
    document_type: String,
    timeout: Duration,
}

impl<'a> Downloader<'a> {
    pub fn new(client: &'a Client, document_type: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client,
            document_type: document_type.into().to_lowercase(),
            timeout,
        }
    }

    pub fn from_config(client: &'a Client, config: &DownloadConfig) -> Self {
        Self::new(
            client,
            config.document_type.clone(),
            Duration::from_secs(config.timeout_secs),
        )
    }

    /// Downloads every link of the document type into `destination`
    ///
    /// Without any such link the directory is left untouched. Otherwise it is
    /// wiped and recreated, then each document is streamed to a sanitized
    /// file name. Individual failures are recorded and the batch continues.
    ///
    /// # Returns
    ///
    /// * `Ok(DownloadReport)` - Per-link outcomes
    /// * `Err(RegdocError)` - The destination directory could not be prepared
    pub async fn download(&self, links: &LinkSet, destination: &Path) -> Result<DownloadReport> {
        let documents: Vec<_> = links.of_type(&self.document_type).collect();

        if documents.is_empty() {
            tracing::info!("No '{}' links to download", self.document_type);
            return Ok(DownloadReport::default());
        }

        clear_directory(destination)?;
        tracing::info!(
            "Downloading {} document(s) into {}",
            documents.len(),
            destination.display()
        );

        let mut report = DownloadReport {
            total: documents.len(),
            ..DownloadReport::default()
        };
        let mut used_names = HashSet::new();

        for (index, link) in documents.iter().enumerate() {
            let name = file_name_from_url(&link.url, &self.document_type, index + 1);
            let name = unique_name(name, &self.document_type, &mut used_names);
            let path = destination.join(&name);

            match download_to_file(self.client, &link.url, &path, self.timeout).await {
                Ok(bytes) => {
                    tracing::debug!("Saved {} ({} bytes) to {}", link.url, bytes, path.display());
                    report.succeeded += 1;
                    report.files.push(DownloadedFile {
                        url: link.url.clone(),
                        local_path: path,
                        outcome: DownloadOutcome::Success,
                        error_detail: None,
                    });
                }
                Err(e) => {
                    tracing::warn!("Failed to download {}: {}", link.url, e);
                    let error = e.to_string();
                    report.failed += 1;
                    report.failures.push(DownloadFailure {
                        url: link.url.clone(),
                        error: error.clone(),
                    });
                    report.files.push(DownloadedFile {
                        url: link.url.clone(),
                        local_path: path,
                        outcome: DownloadOutcome::Error,
                        error_detail: Some(error),
                    });
                }
            }
        }

        tracing::info!(
            "Download finished: {} succeeded, {} failed",
            report.succeeded,
            report.failed
        );
        Ok(report)
    }
}

/// Suffixes `_{n}` before the extension until the name is unused in this batch
fn unique_name(name: String, extension: &str, used: &mut HashSet<String>) -> String {
    if used.insert(name.to_lowercase()) {
        return name;
    }

    let suffix = format!(".{}", extension);
    let stem = name
        .len()
        .checked_sub(suffix.len())
        .and_then(|cut| name.get(..cut))
        .unwrap_or(&name)
        .to_string();

    let mut n = 2;
    loop {
        let candidate = format!("{}_{}{}", stem, n, suffix);
        if used.insert(candidate.to_lowercase()) {
            return candidate;
        }
        n += 1;
    }
}
