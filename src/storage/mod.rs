//! Storage module for persisting discovered links
//!
//! This module handles the link set that makes crawling resumable:
//! - The `Link` and `LinkSet` types (ordered, unique by URL)
//! - The `LinkStore` trait for persistence backends
//! - A JSON file backend

mod json;
mod traits;

pub use json::JsonLinkStore;
pub use traits::{LinkStore, StorageError, StorageResult};

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A discovered link and its type (lowercase extension token)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub url: String,
    #[serde(rename = "type")]
    pub link_type: String,
}

impl Link {
    pub fn new(url: impl Into<String>, link_type: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            link_type: link_type.into(),
        }
    }
}

/// Ordered collection of links, unique by exact URL
///
/// Insertion order is the order of first discovery. Inserting a URL that is
/// already present leaves the set untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkSet {
    links: Vec<Link>,
    urls: HashSet<String>,
}

impl LinkSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a set from a list, dropping later duplicates of the same URL
    pub fn from_links(links: impl IntoIterator<Item = Link>) -> Self {
        let mut set = Self::new();
        for link in links {
            set.insert(link);
        }
        set
    }

    /// Appends a link; returns false if its URL was already present
    pub fn insert(&mut self, link: Link) -> bool {
        if self.urls.contains(&link.url) {
            return false;
        }
        self.urls.insert(link.url.clone());
        self.links.push(link);
        true
    }

    pub fn contains(&self, url: &str) -> bool {
        self.urls.contains(url)
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Link> {
        self.links.iter()
    }

    pub fn links(&self) -> &[Link] {
        &self.links
    }

    /// Links of one type, in discovery order
    pub fn of_type<'a>(&'a self, link_type: &'a str) -> impl Iterator<Item = &'a Link> + 'a {
        self.links.iter().filter(move |l| l.link_type == link_type)
    }

    /// Keeps only the links matching the predicate
    pub fn retain<F: FnMut(&Link) -> bool>(&mut self, mut keep: F) {
        let urls = &mut self.urls;
        self.links.retain(|link| {
            let kept = keep(link);
            if !kept {
                urls.remove(&link.url);
            }
            kept
        });
    }

    pub fn into_links(self) -> Vec<Link> {
        self.links
    }
}
