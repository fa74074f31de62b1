//! OpenSearch query builders.
//!
//! Interactive search and snapshot export deliberately use separate
//! builders: search ranks by relevance with fuzzy matching, export walks a
//! point-in-time snapshot in index order with `search_after`.

use std::time::Duration;

use serde_json::{json, Value};

use crate::types::SnapshotQuery;
use user_search_shared::{RecordFilter, SearchQuery, UserRecord};

/// Default `index.max_result_window`: `from + size` may not exceed it.
pub const MAX_RESULT_WINDOW: usize = 10_000;

/// Whether a page reaches past the engine's result window.
pub fn exceeds_result_window(query: &SearchQuery) -> bool {
    query.from_offset() + query.size() > MAX_RESULT_WINDOW
}

/// Build the body of a paginated relevance search.
///
/// - Match-all filter: `match_all` in the engine's default order
/// - Otherwise: `multi_match` over every record field with `AUTO` fuzziness
///   (1-2 chars: 0 edits, 3-5 chars: 1 edit, 6+ chars: 2 edits)
pub fn build_search_query(query: &SearchQuery) -> Value {
    json!({
        "from": query.from_offset(),
        "size": query.size(),
        "query": build_match_query(&query.filter, Some("AUTO"))
    })
}

/// Build a hit-less search that counts every match of a query exactly.
pub fn build_count_query(query: &SearchQuery) -> Value {
    json!({
        "size": 0,
        "track_total_hits": true,
        "query": build_match_query(&query.filter, Some("AUTO"))
    })
}

/// Build the body of one page request against a point-in-time snapshot.
///
/// Results are sorted by `_doc` so that every record has a fixed position
/// within the snapshot; no fuzziness is applied.
pub fn build_snapshot_query(query: &SnapshotQuery) -> Value {
    let mut body = json!({
        "size": query.size,
        "query": build_match_query(&query.filter, None),
        "pit": {
            "id": query.snapshot.as_str(),
            "keep_alive": keep_alive_param(query.keep_alive)
        },
        "sort": [{ "_doc": "asc" }],
        "track_total_hits": false
    });

    if let Some(cursor) = &query.search_after {
        body["search_after"] = json!(cursor.values());
    }

    body
}

/// Build the match clause for a filter.
fn build_match_query(filter: &RecordFilter, fuzziness: Option<&str>) -> Value {
    match filter {
        RecordFilter::All => json!({ "match_all": {} }),
        RecordFilter::Text(text) => {
            let mut multi_match = json!({
                "query": text,
                "fields": UserRecord::FIELDS
            });
            if let Some(fuzziness) = fuzziness {
                multi_match["fuzziness"] = json!(fuzziness);
            }
            json!({ "multi_match": multi_match })
        }
    }
}

/// Format a keep-alive duration the way the engine expects (`1m`, `30s`, `500ms`).
pub fn keep_alive_param(keep_alive: Duration) -> String {
    let millis = keep_alive.as_millis();
    if millis > 0 && millis % 60_000 == 0 {
        format!("{}m", millis / 60_000)
    } else if millis % 1000 == 0 {
        format!("{}s", millis / 1000)
    } else {
        format!("{millis}ms")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Cursor, SnapshotId};

    fn snapshot_query(filter: RecordFilter, cursor: Option<Cursor>) -> SnapshotQuery {
        SnapshotQuery {
            snapshot: SnapshotId::new("pit-1"),
            keep_alive: Duration::from_secs(60),
            filter,
            search_after: cursor,
            size: 1000,
        }
    }

    #[test]
    fn test_build_search_query_match_all() {
        let query = build_search_query(&SearchQuery::all(1));

        assert_eq!(query["from"], 0);
        assert_eq!(query["size"], 15);
        assert!(query["query"]["match_all"].is_object());
    }

    #[test]
    fn test_build_search_query_fuzzy() {
        let query = build_search_query(&SearchQuery::text("jon smith", 3));

        assert_eq!(query["from"], 30);
        let multi_match = &query["query"]["multi_match"];
        assert_eq!(multi_match["query"], "jon smith");
        assert_eq!(multi_match["fuzziness"], "AUTO");

        let fields = multi_match["fields"].as_array().unwrap();
        assert_eq!(fields.len(), 4);
        assert!(fields.contains(&json!("name")));
        assert!(fields.contains(&json!("country")));
    }

    #[test]
    fn test_build_search_query_keeps_whitespace_text() {
        let query = build_search_query(&SearchQuery::new(Some("   "), 1));

        assert!(query["query"].get("match_all").is_none());
        assert_eq!(query["query"]["multi_match"]["query"], "   ");
    }

    #[test]
    fn test_result_window() {
        // 15 per page: page 666 ends at 9990, page 667 at 10005.
        assert!(!exceeds_result_window(&SearchQuery::all(1)));
        assert!(!exceeds_result_window(&SearchQuery::all(666)));
        assert!(exceeds_result_window(&SearchQuery::all(667)));
        assert!(exceeds_result_window(&SearchQuery::text("ada", u32::MAX)));
    }

    #[test]
    fn test_build_count_query() {
        let query = build_count_query(&SearchQuery::text("jon", 700));

        assert_eq!(query["size"], 0);
        assert_eq!(query["track_total_hits"], true);
        assert!(query.get("from").is_none());
        assert_eq!(query["query"]["multi_match"]["query"], "jon");
        assert_eq!(query["query"]["multi_match"]["fuzziness"], "AUTO");

        let query = build_count_query(&SearchQuery::all(700));
        assert!(query["query"]["match_all"].is_object());
    }

    #[test]
    fn test_build_snapshot_query_first_page() {
        let query = build_snapshot_query(&snapshot_query(RecordFilter::All, None));

        assert_eq!(query["size"], 1000);
        assert_eq!(query["pit"]["id"], "pit-1");
        assert_eq!(query["pit"]["keep_alive"], "1m");
        assert_eq!(query["sort"][0]["_doc"], "asc");
        assert!(query["query"]["match_all"].is_object());
        assert!(query.get("search_after").is_none());
        // Snapshot pages are never offset-paged.
        assert!(query.get("from").is_none());
    }

    #[test]
    fn test_build_snapshot_query_with_cursor_is_not_fuzzy() {
        let cursor = Cursor::new(vec![json!(1999)]);
        let query = build_snapshot_query(&snapshot_query(
            RecordFilter::Text("peru".to_string()),
            Some(cursor),
        ));

        assert_eq!(query["search_after"], json!([1999]));
        assert_eq!(query["query"]["multi_match"]["query"], "peru");
        assert!(query["query"]["multi_match"].get("fuzziness").is_none());
    }

    #[test]
    fn test_keep_alive_param() {
        assert_eq!(keep_alive_param(Duration::from_secs(60)), "1m");
        assert_eq!(keep_alive_param(Duration::from_secs(300)), "5m");
        assert_eq!(keep_alive_param(Duration::from_secs(30)), "30s");
        assert_eq!(keep_alive_param(Duration::from_millis(1500)), "1500ms");
    }
}
