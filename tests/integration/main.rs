//! End-to-end tests for the crawl, download, ingest and index stages
//!
//! HTTP peers (listing pages, document hosts, the search engine) are mocked
//! with wiremock; files live in temporary directories.

mod common;
mod crawl_tests;
mod index_tests;
mod ingest_tests;
