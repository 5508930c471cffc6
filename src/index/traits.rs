//! Search backend trait and error types
//!
//! This module defines the interface the pipeline uses to talk to the search
//! engine, so the bulk indexer can run against any backend.

use crate::ingest::DocumentRecord;
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

/// Errors that can occur while talking to the search engine
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("Search engine unreachable: {0}")]
    Transport(String),

    #[error("Authentication rejected ({0})")]
    Auth(u16),

    #[error("Search engine returned {status}: {body}")]
    Http { status: u16, body: String },

    #[error("Unexpected response: {0}")]
    InvalidResponse(String),

    #[error("Invalid query: {0}")]
    InvalidQuery(String),
}

/// Result type for search backend operations
pub type BackendResult<T> = Result<T, SearchError>;

/// Outcome of one document in a bulk request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulkItem {
    pub id: String,
    pub status: u16,
    /// Engine-provided reason when the document was rejected
    pub error: Option<String>,
}

impl BulkItem {
    pub fn is_accepted(&self) -> bool {
        self.error.is_none() && (200..300).contains(&self.status)
    }
}

/// Summary of one index as reported by the engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndexInfo {
    pub name: String,
    pub doc_count: u64,
    /// Human-readable store size, e.g. "12.3mb"
    pub size: String,
    pub health: String,
    pub status: String,
}

/// Trait for search engine backends
#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// Checks that the engine is reachable and accepts our credentials
    async fn ping(&self) -> BackendResult<()>;

    /// Creates an index; returns false when it already exists
    async fn create_index(&self, index: &str, body: &Value) -> BackendResult<bool>;

    /// Lists the indices known to the engine, sorted by name
    async fn list_indices(&self) -> BackendResult<Vec<IndexInfo>>;

    /// Deletes an index and its documents; returns false when it did not exist
    async fn delete_index(&self, index: &str) -> BackendResult<bool>;

    /// Indexes documents under their identifiers, overwriting existing ones
    async fn bulk_index(&self, index: &str, docs: &[DocumentRecord])
        -> BackendResult<Vec<BulkItem>>;

    /// Runs a search request body and returns the raw response
    async fn search(&self, index: &str, body: &Value) -> BackendResult<Value>;

    /// Fetches a document's source; None when it does not exist
    async fn get(&self, index: &str, id: &str) -> BackendResult<Option<Value>>;

    /// Creates or replaces a document
    async fn put(&self, index: &str, id: &str, doc: &Value) -> BackendResult<()>;

    /// Merges `partial` into an existing document; returns false when it does not exist
    async fn update(&self, index: &str, id: &str, partial: &Value) -> BackendResult<bool>;

    /// Deletes a document; returns false when it did not exist
    async fn delete(&self, index: &str, id: &str) -> BackendResult<bool>;
}
