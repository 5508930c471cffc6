//! Storage traits and error types
//!
//! This module defines the trait interface for link store backends and
//! associated error types.

use crate::storage::LinkSet;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for link store implementations
///
/// A store holds at most one link set, the state of the last crawl run.
pub trait LinkStore {
    /// Loads the persisted link set
    ///
    /// A missing or unreadable store yields an empty set so a crawl can
    /// always start fresh; only I/O failures other than "not found" are errors.
    fn load(&self) -> StorageResult<LinkSet>;

    /// Replaces the persisted link set
    fn save(&self, links: &LinkSet) -> StorageResult<()>;

    /// Removes any persisted state
    fn clear(&self) -> StorageResult<()>;
}
