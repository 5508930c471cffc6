//! JSON file link store
//!
//! The file holds `{ "links": [ { "url": ..., "type": ... }, ... ] }`.

use crate::storage::traits::{LinkStore, StorageError, StorageResult};
use crate::storage::{Link, LinkSet};
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

#[derive(Debug, Serialize, Deserialize)]
struct LinkSetFile {
    #[serde(default)]
    links: Vec<Link>,
}

/// Link store backed by a single JSON file
#[derive(Debug, Clone)]
pub struct JsonLinkStore {
    path: PathBuf,
}

impl JsonLinkStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> StorageError {
        StorageError::Io {
            path: self.path.display().to_string(),
            source,
        }
    }
}

impl LinkStore for JsonLinkStore {
    fn load(&self) -> StorageResult<LinkSet> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::info!("{} not found, starting with an empty link set", self.path.display());
                return Ok(LinkSet::new());
            }
            Err(e) => return Err(self.io_error(e)),
        };

        match serde_json::from_str::<LinkSetFile>(&content) {
            Ok(file) => {
                let total = file.links.len();
                let set = LinkSet::from_links(file.links);
                if set.len() < total {
                    tracing::warn!(
                        "{} held {} duplicate link(s), dropped on load",
                        self.path.display(),
                        total - set.len()
                    );
                }
                tracing::info!("Loaded {} links from {}", set.len(), self.path.display());
                Ok(set)
            }
            Err(e) => {
                tracing::warn!(
                    "{} contains invalid JSON ({}), starting with an empty link set",
                    self.path.display(),
                    e
                );
                Ok(LinkSet::new())
            }
        }
    }

    fn save(&self, links: &LinkSet) -> StorageResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }

        let file = LinkSetFile {
            links: links.links().to_vec(),
        };
        let json = serde_json::to_string_pretty(&file)?;

        // The store file is only ever replaced whole
        let tmp_path = self.path.with_extension("json.tmp");
        std::fs::write(&tmp_path, json).map_err(|e| self.io_error(e))?;
        std::fs::rename(&tmp_path, &self.path).map_err(|e| self.io_error(e))?;

        tracing::info!("Saved {} links to {}", links.len(), self.path.display());
        Ok(())
    }

    fn clear(&self) -> StorageResult<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(self.io_error(e)),
        }
    }
}
