//! In-memory implementation of the search engine client.
//!
//! Records of an index live in an `Arc<Vec<_>>`. A snapshot shares that
//! vector, and writes go through `Arc::make_mut`, so an open snapshot keeps
//! seeing the records as they were when it was opened.

mod matching;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;
use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::debug;
use uuid::Uuid;

use crate::errors::SearchError;
use crate::interfaces::SearchEngineClient;
use crate::schema::IndexSchema;
use crate::types::{
    BulkFailure, BulkWriteSummary, Cursor, SnapshotId, SnapshotPage, SnapshotQuery,
};
use user_search_shared::{RecordFilter, SearchPage, SearchQuery, UserRecord};

struct StoredIndex {
    schema: IndexSchema,
    records: Arc<Vec<UserRecord>>,
}

struct Snapshot {
    schema: IndexSchema,
    records: Arc<Vec<UserRecord>>,
    expires_at: Instant,
}

#[derive(Default)]
struct EngineState {
    indices: HashMap<String, StoredIndex>,
    snapshots: HashMap<String, Snapshot>,
}

/// Search engine held entirely in process memory.
///
/// Implements the full [`SearchEngineClient`] contract: per-record bulk
/// rejection of records with blank fields, relevance search with `AUTO`
/// fuzziness, and point-in-time snapshots with keep-alive expiry and
/// index-order cursors.
#[derive(Default)]
pub struct InMemorySearchEngine {
    state: RwLock<EngineState>,
}

impl InMemorySearchEngine {
    /// Create an engine with no indices.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records stored in an index, or `None` if it does not exist.
    pub async fn document_count(&self, index: &str) -> Option<usize> {
        let state = self.state.read().await;
        state.indices.get(index).map(|stored| stored.records.len())
    }

    /// Number of snapshots currently open.
    pub async fn open_snapshot_count(&self) -> usize {
        self.state.read().await.snapshots.len()
    }

    fn matches(
        schema: &IndexSchema,
        record: &UserRecord,
        filter: &RecordFilter,
        fuzzy: bool,
    ) -> f64 {
        match filter {
            RecordFilter::All => 1.0,
            RecordFilter::Text(text) => matching::score(schema, record, text, fuzzy),
        }
    }
}

#[async_trait]
impl SearchEngineClient for InMemorySearchEngine {
    async fn index_exists(&self, index: &str) -> Result<bool, SearchError> {
        Ok(self.state.read().await.indices.contains_key(index))
    }

    async fn delete_index(&self, index: &str) -> Result<(), SearchError> {
        let mut state = self.state.write().await;
        state
            .indices
            .remove(index)
            .map(|_| ())
            .ok_or_else(|| SearchError::index_deletion(format!("no such index [{}]", index)))
    }

    async fn create_index(&self, index: &str, schema: &IndexSchema) -> Result<(), SearchError> {
        let mut state = self.state.write().await;
        if state.indices.contains_key(index) {
            return Err(SearchError::index_creation(format!(
                "index [{}] already exists",
                index
            )));
        }

        state.indices.insert(
            index.to_string(),
            StoredIndex {
                schema: schema.clone(),
                records: Arc::new(Vec::new()),
            },
        );
        Ok(())
    }

    async fn bulk_write(
        &self,
        index: &str,
        records: &[UserRecord],
    ) -> Result<BulkWriteSummary, SearchError> {
        let mut state = self.state.write().await;
        let stored = state
            .indices
            .get_mut(index)
            .ok_or_else(|| SearchError::bulk_index(format!("no such index [{}]", index)))?;

        let mut summary = BulkWriteSummary::default();
        let target = Arc::make_mut(&mut stored.records);
        for record in records {
            match record.blank_field() {
                None => {
                    target.push(record.clone());
                    summary.succeeded += 1;
                }
                Some(field) => summary.failures.push(BulkFailure {
                    user_id: record.user_id.clone(),
                    status: Some(400),
                    reason: format!("mapper_parsing_exception: field [{}] is blank", field),
                }),
            }
        }

        Ok(summary)
    }

    async fn search(&self, index: &str, query: &SearchQuery) -> Result<SearchPage, SearchError> {
        let state = self.state.read().await;
        let stored = state
            .indices
            .get(index)
            .ok_or_else(|| SearchError::query(format!("no such index [{}]", index)))?;

        let mut scored: Vec<(f64, &UserRecord)> = stored
            .records
            .iter()
            .map(|record| {
                (
                    Self::matches(&stored.schema, record, &query.filter, true),
                    record,
                )
            })
            .filter(|(score, _)| *score > 0.0)
            .collect();

        // Stable sort keeps index order among equal scores.
        scored.sort_by(|a, b| b.0.total_cmp(&a.0));

        let total = scored.len() as u64;
        let results = scored
            .into_iter()
            .skip(query.from_offset())
            .take(query.size())
            .map(|(_, record)| record.clone())
            .collect();

        Ok(SearchPage { total, results })
    }

    async fn open_snapshot(
        &self,
        index: &str,
        keep_alive: Duration,
    ) -> Result<SnapshotId, SearchError> {
        let mut state = self.state.write().await;
        let stored = state
            .indices
            .get(index)
            .ok_or_else(|| SearchError::snapshot(format!("no such index [{}]", index)))?;

        let snapshot = Snapshot {
            schema: stored.schema.clone(),
            records: Arc::clone(&stored.records),
            expires_at: Instant::now() + keep_alive,
        };
        let id = Uuid::new_v4().to_string();
        state.snapshots.insert(id.clone(), snapshot);

        debug!(index = %index, snapshot = %id, "Opened in-memory snapshot");
        Ok(SnapshotId::new(id))
    }

    async fn query_snapshot(&self, query: &SnapshotQuery) -> Result<SnapshotPage, SearchError> {
        let mut state = self.state.write().await;
        let id = query.snapshot.as_str();

        let expired = match state.snapshots.get(id) {
            None => {
                return Err(SearchError::snapshot(format!(
                    "no such snapshot [{}]",
                    query.snapshot
                )))
            }
            Some(snapshot) => snapshot.expires_at <= Instant::now(),
        };
        if expired {
            state.snapshots.remove(id);
            return Err(SearchError::snapshot(format!(
                "snapshot [{}] expired",
                query.snapshot
            )));
        }

        let start = match &query.search_after {
            None => 0,
            Some(cursor) => {
                let position = cursor
                    .values()
                    .first()
                    .and_then(|v| v.as_u64())
                    .ok_or_else(|| SearchError::invalid_query("malformed search_after cursor"))?;
                position as usize + 1
            }
        };

        let Some(snapshot) = state.snapshots.get_mut(id) else {
            return Err(SearchError::snapshot("snapshot vanished"));
        };
        snapshot.expires_at = Instant::now() + query.keep_alive;

        let page: Vec<(usize, UserRecord)> = snapshot
            .records
            .iter()
            .enumerate()
            .skip(start)
            .filter(|(_, record)| {
                Self::matches(&snapshot.schema, record, &query.filter, false) > 0.0
            })
            .take(query.size)
            .map(|(position, record)| (position, record.clone()))
            .collect();

        let cursor = page
            .last()
            .map(|(position, _)| Cursor::new(vec![json!(position)]));

        Ok(SnapshotPage {
            records: page.into_iter().map(|(_, record)| record).collect(),
            cursor,
        })
    }

    async fn close_snapshot(&self, snapshot: &SnapshotId) -> Result<(), SearchError> {
        let mut state = self.state.write().await;
        state
            .snapshots
            .remove(snapshot.as_str())
            .map(|_| ())
            .ok_or_else(|| SearchError::snapshot(format!("no such snapshot [{}]", snapshot)))
    }

    async fn health_check(&self) -> Result<bool, SearchError> {
        Ok(true)
    }
}
