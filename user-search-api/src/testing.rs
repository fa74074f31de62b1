//! Test doubles shared by the API tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use user_search_repository::{
    BulkWriteSummary, IndexSchema, InMemorySearchEngine, SearchEngineClient, SearchError,
    SnapshotId, SnapshotPage, SnapshotQuery,
};
use user_search_shared::{SearchPage, SearchQuery, UserRecord};

pub const INDEX: &str = "users";

pub fn users(count: usize) -> Vec<UserRecord> {
    (0..count)
        .map(|i| {
            UserRecord::new(
                format!("u-{i}"),
                format!("User Number{i}"),
                format!("user{i}@example.com"),
                if i % 2 == 0 { "Peru" } else { "Chad" },
            )
        })
        .collect()
}

/// In-memory engine that counts snapshot traffic and can inject failures.
#[derive(Default)]
pub struct CountingEngine {
    pub inner: InMemorySearchEngine,
    pub opens: AtomicUsize,
    pub queries: AtomicUsize,
    pub closes: AtomicUsize,
    pub searches: AtomicUsize,
    /// Fail `open_snapshot` and `search` as if the engine were down.
    pub unavailable: bool,
    /// Fail the n-th (1-based) snapshot query.
    pub fail_query: Option<usize>,
}

impl CountingEngine {
    pub async fn with_users(count: usize) -> Self {
        let engine = Self::default();
        engine.seed(count).await;
        engine
    }

    pub async fn seed(&self, count: usize) {
        self.inner
            .create_index(INDEX, &IndexSchema::users())
            .await
            .unwrap();
        self.inner.bulk_write(INDEX, &users(count)).await.unwrap();
    }

    pub fn closes(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }

    pub fn queries(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }

    /// Yield to the runtime until a spawned release has run.
    pub async fn wait_for_closes(&self, expected: usize) {
        for _ in 0..100 {
            if self.closes() >= expected {
                return;
            }
            tokio::task::yield_now().await;
        }
    }
}

#[async_trait]
impl SearchEngineClient for CountingEngine {
    async fn index_exists(&self, index: &str) -> Result<bool, SearchError> {
        self.inner.index_exists(index).await
    }

    async fn delete_index(&self, index: &str) -> Result<(), SearchError> {
        self.inner.delete_index(index).await
    }

    async fn create_index(&self, index: &str, schema: &IndexSchema) -> Result<(), SearchError> {
        self.inner.create_index(index, schema).await
    }

    async fn bulk_write(
        &self,
        index: &str,
        records: &[UserRecord],
    ) -> Result<BulkWriteSummary, SearchError> {
        self.inner.bulk_write(index, records).await
    }

    async fn search(&self, index: &str, query: &SearchQuery) -> Result<SearchPage, SearchError> {
        self.searches.fetch_add(1, Ordering::SeqCst);
        if self.unavailable {
            return Err(SearchError::connection("connection refused"));
        }
        self.inner.search(index, query).await
    }

    async fn open_snapshot(
        &self,
        index: &str,
        keep_alive: Duration,
    ) -> Result<SnapshotId, SearchError> {
        self.opens.fetch_add(1, Ordering::SeqCst);
        if self.unavailable {
            return Err(SearchError::connection("connection refused"));
        }
        self.inner.open_snapshot(index, keep_alive).await
    }

    async fn query_snapshot(&self, query: &SnapshotQuery) -> Result<SnapshotPage, SearchError> {
        let call = self.queries.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fail_query == Some(call) {
            return Err(SearchError::query("shard failure"));
        }
        self.inner.query_snapshot(query).await
    }

    async fn close_snapshot(&self, snapshot: &SnapshotId) -> Result<(), SearchError> {
        self.closes.fetch_add(1, Ordering::SeqCst);
        self.inner.close_snapshot(snapshot).await
    }

    async fn health_check(&self) -> Result<bool, SearchError> {
        Ok(!self.unavailable)
    }
}
