//! Streaming export of every record matching a query.
//!
//! An export opens a point-in-time snapshot, pages through it in index order
//! with a `search_after` cursor, and yields records lazily. The snapshot is
//! owned by a [`SnapshotGuard`] that lives inside the stream state, so the
//! snapshot is released exactly once whether the stream is exhausted, fails,
//! or is dropped by the consumer.

mod guard;

pub use guard::SnapshotGuard;

use std::sync::Arc;
use std::time::Duration;

use axum::body::Bytes;
use futures::stream::{self, Stream, TryStreamExt};
use tracing::{debug, info, instrument};

use user_search_repository::{SearchEngineClient, SearchError, SnapshotQuery};
use user_search_shared::{RecordFilter, UserRecord};

/// Configuration for exports.
#[derive(Debug, Clone)]
pub struct ExportConfig {
    /// Records fetched per snapshot query.
    pub page_size: usize,
    /// Snapshot lifetime, refreshed by every page fetch.
    pub keep_alive: Duration,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            page_size: 1000,
            keep_alive: Duration::from_secs(60),
        }
    }
}

struct ExportState {
    client: Arc<dyn SearchEngineClient>,
    guard: SnapshotGuard,
    query: SnapshotQuery,
    buffered: std::vec::IntoIter<UserRecord>,
    pages: usize,
    exported: usize,
}

/// An export with an open snapshot, ready to stream.
pub struct ExportSession {
    state: ExportState,
}

impl ExportSession {
    /// Open a snapshot on `index` for an export of `filter`.
    ///
    /// Failing to open the snapshot is reported here, before any record is
    /// produced.
    #[instrument(skip(client, config), fields(page_size = config.page_size))]
    pub async fn open(
        client: Arc<dyn SearchEngineClient>,
        index: &str,
        filter: RecordFilter,
        config: &ExportConfig,
    ) -> Result<Self, SearchError> {
        if config.page_size == 0 {
            return Err(SearchError::invalid_query("export page size must be positive"));
        }

        let snapshot = client.open_snapshot(index, config.keep_alive).await?;
        info!(snapshot = %snapshot, "Opened export snapshot");

        let query =
            SnapshotQuery::first_page(snapshot.clone(), config.keep_alive, filter, config.page_size);
        let guard = SnapshotGuard::new(client.clone(), snapshot);

        Ok(Self {
            state: ExportState {
                client,
                guard,
                query,
                buffered: Vec::new().into_iter(),
                pages: 0,
                exported: 0,
            },
        })
    }

    /// Lazily yield every matching record in index order.
    ///
    /// An engine error ends the stream after the records already yielded.
    pub fn records(self) -> impl Stream<Item = Result<UserRecord, SearchError>> + Send + 'static {
        stream::try_unfold(self.state, next_record)
    }

    /// Lazily yield every matching record as one newline-terminated JSON line.
    pub fn ndjson(self) -> impl Stream<Item = Result<Bytes, SearchError>> + Send + 'static {
        self.records().and_then(|record| async move { ndjson_line(&record) })
    }
}

/// Advance an export by one record, fetching the next page when the
/// current one is used up.
async fn next_record(
    mut state: ExportState,
) -> Result<Option<(UserRecord, ExportState)>, SearchError> {
    loop {
        if let Some(record) = state.buffered.next() {
            state.exported += 1;
            return Ok(Some((record, state)));
        }

        let page = state.client.query_snapshot(&state.query).await?;
        state.pages += 1;

        if page.is_empty() {
            info!(
                snapshot = %state.query.snapshot,
                pages = state.pages,
                exported = state.exported,
                "Export complete"
            );
            state.guard.release().await;
            return Ok(None);
        }

        debug!(page = state.pages, records = page.records.len(), "Fetched export page");
        let Some(cursor) = page.cursor else {
            return Err(SearchError::parse("export page is missing sort values"));
        };
        state.query.search_after = Some(cursor);
        state.buffered = page.records.into_iter();
    }
}

/// Encode a record as one NDJSON line.
pub fn ndjson_line(record: &UserRecord) -> Result<Bytes, SearchError> {
    let mut line = serde_json::to_vec(record)?;
    line.push(b'\n');
    Ok(Bytes::from(line))
}
