//! Search engine client trait definition.
//!
//! This module defines the abstract interface for search engine operations,
//! allowing for different backend implementations (OpenSearch, in-memory, etc.).

use std::time::Duration;

use async_trait::async_trait;

use crate::errors::SearchError;
use crate::schema::IndexSchema;
use crate::types::{BulkWriteSummary, SnapshotId, SnapshotPage, SnapshotQuery};
use user_search_shared::{SearchPage, SearchQuery, UserRecord};

/// Abstract interface for search engine operations.
///
/// This trait defines every operation the ingestion pipeline and the HTTP
/// service need from a search engine. A single client is constructed at
/// process start and shared as `Arc<dyn SearchEngineClient>`, so tests can
/// substitute a fake engine.
///
/// # Thread Safety
///
/// All implementations must be `Send + Sync` to allow use across async tasks.
///
/// # Error Handling
///
/// All methods return `Result<T, SearchError>` for consistent error handling.
#[async_trait]
pub trait SearchEngineClient: Send + Sync {
    /// Check whether an index with the given name exists.
    async fn index_exists(&self, index: &str) -> Result<bool, SearchError>;

    /// Delete an index and all of its records.
    async fn delete_index(&self, index: &str) -> Result<(), SearchError>;

    /// Create an empty index with the given schema.
    ///
    /// # Returns
    ///
    /// * `Ok(())` - If the index was created
    /// * `Err(SearchError::IndexCreationError)` - If it already exists or creation fails
    async fn create_index(&self, index: &str, schema: &IndexSchema) -> Result<(), SearchError>;

    /// Write a chunk of records in a single bulk request.
    ///
    /// Individual records may be rejected without failing the request; those
    /// are reported in the returned summary.
    ///
    /// # Returns
    ///
    /// * `Ok(BulkWriteSummary)` - Success count and per-record failures
    /// * `Err(SearchError)` - If the request as a whole failed
    async fn bulk_write(
        &self,
        index: &str,
        records: &[UserRecord],
    ) -> Result<BulkWriteSummary, SearchError>;

    /// Execute a paginated, relevance-ranked search.
    ///
    /// Match-all filters select every record. Text queries are fuzzy-matched over
    /// all record fields. A page past the last result is empty, not an error.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let page = client.search("users", &SearchQuery::text("ada", 1)).await?;
    /// println!("Found about {} results", page.total);
    /// ```
    async fn search(&self, index: &str, query: &SearchQuery) -> Result<SearchPage, SearchError>;

    /// Open a point-in-time snapshot of an index.
    ///
    /// The snapshot expires after `keep_alive` unless refreshed by a query.
    async fn open_snapshot(
        &self,
        index: &str,
        keep_alive: Duration,
    ) -> Result<SnapshotId, SearchError>;

    /// Read one page from an open snapshot, in stable index order.
    async fn query_snapshot(&self, query: &SnapshotQuery) -> Result<SnapshotPage, SearchError>;

    /// Release a snapshot.
    async fn close_snapshot(&self, snapshot: &SnapshotId) -> Result<(), SearchError>;

    /// Check if the search engine is healthy and reachable.
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - If the search engine is healthy
    /// * `Ok(false)` - If the search engine is unhealthy
    /// * `Err(SearchError)` - If the health check fails to execute
    async fn health_check(&self) -> Result<bool, SearchError>;
}
