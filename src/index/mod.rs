//! Search engine boundary
//!
//! This module handles everything that talks to the search engine:
//! - The `SearchBackend` trait and its Elasticsearch adapter
//! - Index administration (create, list, delete)
//! - Bulk indexing of normalized records
//! - The regulatory index mapping
//! - Search request building and response parsing

mod bulk;
mod elastic;
mod query;
mod schema;
mod traits;

pub use bulk::{index_batch, IndexReport, Rejection};
pub use elastic::{ElasticClient, API_KEY_ENV};
pub use query::{
    build_search_body, SearchHit, SearchQuery, SearchResult, ALL_FIELDS, DEFAULT_SEARCH_SIZE,
    WEIGHTED_FIELDS,
};
pub use schema::regulatory_mapping;
pub use traits::{BackendResult, BulkItem, IndexInfo, SearchBackend, SearchError};

/// Runs a search and parses the response
pub async fn run_search(
    backend: &dyn SearchBackend,
    index: &str,
    query: &SearchQuery,
) -> Result<SearchResult, SearchError> {
    let body = build_search_body(query)?;
    let response = backend.search(index, &body).await?;
    SearchResult::from_response(&response)
}
