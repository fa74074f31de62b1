//! Request and response types for engine operations.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use user_search_shared::{RecordFilter, UserRecord};

/// Opaque token of an engine-held point-in-time snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SnapshotId(String);

impl SnapshotId {
    /// Wrap a token returned by the engine.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The raw token.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SnapshotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Tokens can be several hundred bytes long.
        if self.0.chars().count() > 16 {
            let head: String = self.0.chars().take(16).collect();
            write!(f, "{head}…")
        } else {
            f.write_str(&self.0)
        }
    }
}

/// Sort values of the last record of a page, used as `search_after`.
///
/// Only meaningful inside the snapshot that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cursor(Vec<Value>);

impl Cursor {
    /// Wrap raw sort values.
    pub fn new(values: Vec<Value>) -> Self {
        Self(values)
    }

    /// The raw sort values.
    pub fn values(&self) -> &[Value] {
        &self.0
    }
}

/// One page request against an open snapshot.
///
/// Results are always sorted by index order, never by relevance, so that
/// consecutive pages neither overlap nor skip records.
#[derive(Debug, Clone)]
pub struct SnapshotQuery {
    /// Snapshot to read from.
    pub snapshot: SnapshotId,
    /// Lifetime extension applied by this request.
    pub keep_alive: Duration,
    /// Which records to return. Text is matched without fuzziness.
    pub filter: RecordFilter,
    /// Cursor of the previous page; `None` for the first page.
    pub search_after: Option<Cursor>,
    /// Maximum number of records to return.
    pub size: usize,
}

impl SnapshotQuery {
    /// First-page request for the given snapshot.
    pub fn first_page(
        snapshot: SnapshotId,
        keep_alive: Duration,
        filter: RecordFilter,
        size: usize,
    ) -> Self {
        Self {
            snapshot,
            keep_alive,
            filter,
            search_after: None,
            size,
        }
    }
}

/// One page read from a snapshot.
#[derive(Debug, Clone, Default)]
pub struct SnapshotPage {
    /// Records in tiebreaker order.
    pub records: Vec<UserRecord>,
    /// Sort values of the last record; `None` when the page is empty.
    pub cursor: Option<Cursor>,
}

impl SnapshotPage {
    /// Whether the snapshot is exhausted.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// A record the engine refused during a bulk write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulkFailure {
    /// Identifier of the rejected record.
    pub user_id: String,
    /// Per-item HTTP status, when the engine reported one.
    pub status: Option<u16>,
    /// Engine-provided reason.
    pub reason: String,
}

/// Outcome of one bulk write request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BulkWriteSummary {
    /// Number of records written.
    pub succeeded: usize,
    /// Records the engine rejected.
    pub failures: Vec<BulkFailure>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_cursor_serializes_as_array() {
        let cursor = Cursor::new(vec![json!(42), json!("abc")]);
        assert_eq!(serde_json::to_value(&cursor).unwrap(), json!([42, "abc"]));
    }

    #[test]
    fn test_snapshot_id_display_truncates() {
        let short = SnapshotId::new("abc");
        assert_eq!(short.to_string(), "abc");

        let long = SnapshotId::new("a".repeat(64));
        assert_eq!(long.to_string(), format!("{}…", "a".repeat(16)));
        assert_eq!(long.as_str().len(), 64);
    }
}
