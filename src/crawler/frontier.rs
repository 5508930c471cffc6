//! Crawl frontier: FIFO queue of listing pages still to visit
//!
//! A URL is admitted at most once over the lifetime of a frontier, whether it
//! is still queued or already visited.

use std::collections::{HashSet, VecDeque};

#[derive(Debug, Default)]
pub struct Frontier {
    queue: VecDeque<String>,
    admitted: HashSet<String>,
    visited: HashSet<String>,
}

impl Frontier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueues a URL unless it was ever admitted before
    ///
    /// # Returns
    ///
    /// * `true` - The URL was queued
    /// * `false` - The URL is already queued or visited
    pub fn push(&mut self, url: impl Into<String>) -> bool {
        let url = url.into();
        if self.admitted.contains(&url) {
            return false;
        }
        self.admitted.insert(url.clone());
        self.queue.push_back(url);
        true
    }

    /// Dequeues the oldest URL and marks it visited
    pub fn pop(&mut self) -> Option<String> {
        let url = self.queue.pop_front()?;
        self.visited.insert(url.clone());
        Some(url)
    }

    /// Marks a URL visited without it passing through the queue
    pub fn mark_visited(&mut self, url: impl Into<String>) {
        let url = url.into();
        self.admitted.insert(url.clone());
        self.visited.insert(url);
    }

    pub fn is_visited(&self, url: &str) -> bool {
        self.visited.contains(url)
    }

    /// Number of URLs waiting to be fetched
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }
}
