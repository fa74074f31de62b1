//! # User Search Repository
//!
//! This crate provides the trait and implementations for interacting with
//! the search engine. It includes definitions for errors, the index schema,
//! a concrete implementation for OpenSearch, and an in-memory engine used by
//! tests and local runs.

pub mod errors;
pub mod interfaces;
pub mod memory;
pub mod opensearch;
pub mod schema;
pub mod types;

pub use errors::SearchError;
pub use interfaces::SearchEngineClient;
pub use memory::InMemorySearchEngine;
pub use opensearch::OpenSearchClient;
pub use schema::{FieldType, IndexSchema};
pub use types::{BulkFailure, BulkWriteSummary, Cursor, SnapshotId, SnapshotPage, SnapshotQuery};
