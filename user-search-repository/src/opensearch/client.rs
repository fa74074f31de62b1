//! OpenSearch client implementation.
//!
//! This module provides the concrete implementation of `SearchEngineClient`
//! using the OpenSearch Rust client.

use std::time::Duration;

use async_trait::async_trait;
use opensearch::{
    cluster::ClusterHealthParts,
    http::{
        headers::HeaderMap,
        request::JsonBody,
        response::Response,
        transport::{SingleNodeConnectionPool, TransportBuilder},
        Method,
    },
    indices::{IndicesCreateParts, IndicesDeleteParts, IndicesExistsParts},
    BulkParts, OpenSearch, SearchParts,
};
use serde_json::{json, Value};
use tracing::{debug, error, info, instrument, warn};
use url::Url;

use crate::errors::SearchError;
use crate::interfaces::SearchEngineClient;
use crate::opensearch::index_config::get_index_settings;
use crate::opensearch::queries::{
    build_count_query, build_search_query, build_snapshot_query, exceeds_result_window,
    keep_alive_param,
};
use crate::schema::IndexSchema;
use crate::types::{
    BulkFailure, BulkWriteSummary, Cursor, SnapshotId, SnapshotPage, SnapshotQuery,
};
use user_search_shared::{SearchPage, SearchQuery, UserRecord};

/// OpenSearch client implementation.
///
/// Provides full-text search, bulk writes and point-in-time snapshots using
/// OpenSearch as the backend.
///
/// # Example
///
/// ```ignore
/// let client = OpenSearchClient::new("http://localhost:9200").await?;
/// let page = client.search("users", &SearchQuery::text("ada", 1)).await?;
/// ```
pub struct OpenSearchClient {
    client: OpenSearch,
}

impl OpenSearchClient {
    /// Create a new OpenSearch client connected to the specified URL.
    ///
    /// # Arguments
    ///
    /// * `url` - The OpenSearch server URL (e.g., "http://localhost:9200")
    ///
    /// # Returns
    ///
    /// * `Ok(OpenSearchClient)` - A new client instance
    /// * `Err(SearchError)` - If connection setup fails
    pub async fn new(url: &str) -> Result<Self, SearchError> {
        let parsed_url = Url::parse(url).map_err(|e| SearchError::connection(e.to_string()))?;

        let conn_pool = SingleNodeConnectionPool::new(parsed_url);
        let transport = TransportBuilder::new(conn_pool)
            .disable_proxy()
            .build()
            .map_err(|e| SearchError::connection(e.to_string()))?;

        let client = OpenSearch::new(transport);

        info!(url = %url, "Created OpenSearch client");

        Ok(Self { client })
    }

    /// Exact number of records matching a search, without fetching any.
    async fn count_matches(&self, index: &str, query: &SearchQuery) -> Result<u64, SearchError> {
        let response = self
            .client
            .search(SearchParts::Index(&[index]))
            .body(build_count_query(query))
            .send()
            .await
            .map_err(transport_error)?;

        let body = read_json(response, "Count", SearchError::query).await?;
        Ok(parse_total(&body))
    }
}

#[async_trait]
impl SearchEngineClient for OpenSearchClient {
    async fn index_exists(&self, index: &str) -> Result<bool, SearchError> {
        let response = self
            .client
            .indices()
            .exists(IndicesExistsParts::Index(&[index]))
            .send()
            .await
            .map_err(transport_error)?;

        match response.status_code().as_u16() {
            200 => Ok(true),
            404 => Ok(false),
            status => Err(SearchError::query(format!(
                "Index exists check failed with status {}",
                status
            ))),
        }
    }

    #[instrument(skip(self))]
    async fn delete_index(&self, index: &str) -> Result<(), SearchError> {
        let response = self
            .client
            .indices()
            .delete(IndicesDeleteParts::Index(&[index]))
            .send()
            .await
            .map_err(transport_error)?;

        read_json(response, "Delete index", SearchError::index_deletion).await?;
        info!(index = %index, "Deleted index");
        Ok(())
    }

    #[instrument(skip(self, schema))]
    async fn create_index(&self, index: &str, schema: &IndexSchema) -> Result<(), SearchError> {
        let response = self
            .client
            .indices()
            .create(IndicesCreateParts::Index(index))
            .body(get_index_settings(schema))
            .send()
            .await
            .map_err(transport_error)?;

        read_json(response, "Create index", SearchError::index_creation).await?;
        info!(index = %index, "Created index");
        Ok(())
    }

    async fn bulk_write(
        &self,
        index: &str,
        records: &[UserRecord],
    ) -> Result<BulkWriteSummary, SearchError> {
        if records.is_empty() {
            return Ok(BulkWriteSummary::default());
        }

        let mut body: Vec<JsonBody<Value>> = Vec::with_capacity(records.len() * 2);
        for record in records {
            body.push(json!({ "index": {} }).into());
            body.push(serde_json::to_value(record)?.into());
        }

        let response = self
            .client
            .bulk(BulkParts::Index(index))
            .body(body)
            .send()
            .await
            .map_err(transport_error)?;

        let body = read_json(response, "Bulk write", SearchError::bulk_index).await?;
        let summary = parse_bulk_response(&body, records)?;

        debug!(
            succeeded = summary.succeeded,
            failed = summary.failures.len(),
            "Bulk write completed"
        );
        Ok(summary)
    }

    async fn search(&self, index: &str, query: &SearchQuery) -> Result<SearchPage, SearchError> {
        // The engine rejects from + size past its window even when the page
        // is simply beyond the last match.
        if exceeds_result_window(query) {
            let total = self.count_matches(index, query).await?;
            if let Some(page) = page_past_end(query, total) {
                return Ok(page);
            }
            warn!(
                page = query.page,
                total = total,
                "Search page lies beyond the result window"
            );
        }

        let response = self
            .client
            .search(SearchParts::Index(&[index]))
            .body(build_search_query(query))
            .send()
            .await
            .map_err(transport_error)?;

        let body = read_json(response, "Search", SearchError::query).await?;
        let results = parse_hits(&body)?
            .into_iter()
            .map(|(record, _)| record)
            .collect();

        Ok(SearchPage {
            total: parse_total(&body),
            results,
        })
    }

    async fn open_snapshot(
        &self,
        index: &str,
        keep_alive: Duration,
    ) -> Result<SnapshotId, SearchError> {
        let path = format!("/{}/_search/point_in_time", index);
        let keep_alive = keep_alive_param(keep_alive);

        let response = self
            .client
            .send(
                Method::Post,
                &path,
                HeaderMap::new(),
                Some(&[("keep_alive", keep_alive.as_str())]),
                Option::<JsonBody<Value>>::None,
                None,
            )
            .await
            .map_err(transport_error)?;

        let body = read_json(response, "Open snapshot", SearchError::snapshot).await?;
        let snapshot = parse_snapshot_id(&body)?;

        debug!(index = %index, snapshot = %snapshot, "Opened snapshot");
        Ok(snapshot)
    }

    async fn query_snapshot(&self, query: &SnapshotQuery) -> Result<SnapshotPage, SearchError> {
        let response = self
            .client
            .search(SearchParts::None)
            .body(build_snapshot_query(query))
            .send()
            .await
            .map_err(transport_error)?;

        let body = read_json(response, "Snapshot query", SearchError::query).await?;
        let hits = parse_hits(&body)?;

        let cursor = hits.last().and_then(|(_, cursor)| cursor.clone());
        Ok(SnapshotPage {
            records: hits.into_iter().map(|(record, _)| record).collect(),
            cursor,
        })
    }

    async fn close_snapshot(&self, snapshot: &SnapshotId) -> Result<(), SearchError> {
        let response = self
            .client
            .send(
                Method::Delete,
                "/_search/point_in_time",
                HeaderMap::new(),
                Option::<&()>::None,
                Some(JsonBody::new(json!({ "pit_id": [snapshot.as_str()] }))),
                None,
            )
            .await
            .map_err(transport_error)?;

        read_json(response, "Close snapshot", SearchError::snapshot).await?;
        debug!(snapshot = %snapshot, "Closed snapshot");
        Ok(())
    }

    async fn health_check(&self) -> Result<bool, SearchError> {
        let response = self
            .client
            .cluster()
            .health(ClusterHealthParts::None)
            .send()
            .await
            .map_err(transport_error)?;

        let body = read_json(response, "Health check", SearchError::connection).await?;
        Ok(matches!(body["status"].as_str(), Some("green") | Some("yellow")))
    }
}

/// Map a transport failure, keeping timeouts distinguishable.
fn transport_error(err: opensearch::Error) -> SearchError {
    if err.is_timeout() {
        SearchError::timeout(err.to_string())
    } else {
        SearchError::connection(err.to_string())
    }
}

/// Check the status of a response and decode its JSON body.
async fn read_json(
    response: Response,
    operation: &str,
    on_status: fn(String) -> SearchError,
) -> Result<Value, SearchError> {
    let status = response.status_code();
    if !status.is_success() {
        let error_body = response.text().await.unwrap_or_default();
        error!(status = %status, body = %error_body, "{} request failed", operation);
        return Err(on_status(format!(
            "{} failed with status {}: {}",
            operation, status, error_body
        )));
    }

    response
        .json::<Value>()
        .await
        .map_err(|e| SearchError::parse(e.to_string()))
}

/// Extract `_source` and `sort` of every hit.
fn parse_hits(body: &Value) -> Result<Vec<(UserRecord, Option<Cursor>)>, SearchError> {
    let Some(hits) = body["hits"]["hits"].as_array() else {
        return Err(SearchError::parse("response has no hits array"));
    };

    hits.iter()
        .map(|hit| {
            let record: UserRecord = serde_json::from_value(hit["_source"].clone())
                .map_err(|e| SearchError::parse(format!("invalid hit source: {}", e)))?;
            let cursor = hit["sort"]
                .as_array()
                .map(|values| Cursor::new(values.clone()));
            Ok((record, cursor))
        })
        .collect()
}

/// The empty page for a query that starts at or after the last of `total` matches.
fn page_past_end(query: &SearchQuery, total: u64) -> Option<SearchPage> {
    (query.from_offset() as u64 >= total).then(|| SearchPage {
        total,
        results: Vec::new(),
    })
}

/// Read `hits.total`, which is either an object or a bare number.
fn parse_total(body: &Value) -> u64 {
    let total = &body["hits"]["total"];
    total["value"].as_u64().or_else(|| total.as_u64()).unwrap_or(0)
}

fn parse_snapshot_id(body: &Value) -> Result<SnapshotId, SearchError> {
    body["pit_id"]
        .as_str()
        .or_else(|| body["id"].as_str())
        .map(SnapshotId::new)
        .ok_or_else(|| SearchError::parse("snapshot response has no pit_id"))
}

/// Pair each bulk response item with the record it was sent for.
fn parse_bulk_response(
    body: &Value,
    records: &[UserRecord],
) -> Result<BulkWriteSummary, SearchError> {
    let items = body["items"]
        .as_array()
        .ok_or_else(|| SearchError::parse("bulk response has no items"))?;

    if items.len() != records.len() {
        return Err(SearchError::parse(format!(
            "bulk response has {} items for {} records",
            items.len(),
            records.len()
        )));
    }

    let mut summary = BulkWriteSummary::default();
    for (item, record) in items.iter().zip(records) {
        let result = item.get("index").unwrap_or(item);
        match result.get("error") {
            None => summary.succeeded += 1,
            Some(error) => summary.failures.push(BulkFailure {
                user_id: record.user_id.clone(),
                status: result["status"].as_u64().and_then(|s| u16::try_from(s).ok()),
                reason: error_reason(error),
            }),
        }
    }

    Ok(summary)
}

fn error_reason(error: &Value) -> String {
    match (error["type"].as_str(), error["reason"].as_str()) {
        (Some(kind), Some(reason)) => format!("{}: {}", kind, reason),
        (Some(kind), None) => kind.to_string(),
        _ => error.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str) -> UserRecord {
        UserRecord::new(id, "Ada Lovelace", "ada@example.com", "Peru")
    }

    #[test]
    fn test_parse_hits() {
        let body = json!({
            "hits": {
                "total": { "value": 2, "relation": "eq" },
                "hits": [
                    {
                        "_source": {
                            "user_id": "u-1",
                            "name": "Ada Lovelace",
                            "email": "ada@example.com",
                            "country": "Peru"
                        },
                        "sort": [7]
                    },
                    {
                        "_source": {
                            "user_id": "u-2",
                            "name": "Alan Turing",
                            "email": "alan@example.com",
                            "country": "Chad"
                        },
                        "sort": [9]
                    }
                ]
            }
        });

        let hits = parse_hits(&body).unwrap();

        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].0.user_id, "u-1");
        assert_eq!(hits[1].0.name, "Alan Turing");
        assert_eq!(hits[1].1, Some(Cursor::new(vec![json!(9)])));
        assert_eq!(parse_total(&body), 2);
    }

    #[test]
    fn test_parse_hits_without_sort() {
        let body = json!({
            "hits": {
                "total": 1,
                "hits": [{
                    "_source": {
                        "user_id": "u-1",
                        "name": "Ada",
                        "email": "ada@example.com",
                        "country": "Peru"
                    },
                    "_score": 1.5
                }]
            }
        });

        let hits = parse_hits(&body).unwrap();
        assert!(hits[0].1.is_none());
        assert_eq!(parse_total(&body), 1);
    }

    #[test]
    fn test_parse_hits_invalid_source() {
        let body = json!({
            "hits": { "hits": [{ "_source": { "name": "Missing fields" } }] }
        });

        assert!(matches!(parse_hits(&body), Err(SearchError::ParseError(_))));
    }

    #[test]
    fn test_parse_hits_missing_hits() {
        assert!(parse_hits(&json!({ "took": 1 })).is_err());
    }

    #[test]
    fn test_parse_snapshot_id() {
        let id = parse_snapshot_id(&json!({ "pit_id": "abc==", "creation_time": 1 })).unwrap();
        assert_eq!(id.as_str(), "abc==");

        let id = parse_snapshot_id(&json!({ "id": "es-style" })).unwrap();
        assert_eq!(id.as_str(), "es-style");

        assert!(parse_snapshot_id(&json!({})).is_err());
    }

    #[test]
    fn test_parse_bulk_response_partial_failure() {
        let records = vec![record("u-1"), record("u-2"), record("u-3")];
        let body = json!({
            "errors": true,
            "items": [
                { "index": { "status": 201, "result": "created" } },
                { "index": {
                    "status": 400,
                    "error": { "type": "mapper_parsing_exception", "reason": "failed to parse" }
                } },
                { "index": { "status": 201, "result": "created" } }
            ]
        });

        let summary = parse_bulk_response(&body, &records).unwrap();

        assert_eq!(summary.succeeded, 2);
        assert_eq!(summary.failures.len(), 1);
        assert_eq!(summary.failures[0].user_id, "u-2");
        assert_eq!(summary.failures[0].status, Some(400));
        assert_eq!(
            summary.failures[0].reason,
            "mapper_parsing_exception: failed to parse"
        );
    }

    #[test]
    fn test_parse_bulk_response_out_of_range_status() {
        let records = vec![record("u-1")];
        let body = json!({
            "items": [{ "index": {
                "status": 70_000,
                "error": { "type": "weird_exception" }
            } }]
        });

        let summary = parse_bulk_response(&body, &records).unwrap();

        assert_eq!(summary.failures[0].status, None);
        assert_eq!(summary.failures[0].reason, "weird_exception");
    }

    #[test]
    fn test_page_past_end_beyond_result_window() {
        let deep = SearchQuery::text("ada", 800);
        let count = json!({ "hits": { "total": { "value": 42, "relation": "eq" }, "hits": [] } });

        let page = page_past_end(&deep, parse_total(&count)).unwrap();
        assert_eq!(page.total, 42);
        assert!(page.results.is_empty());

        // Page 800 starts at record 11985; a larger total is a real window overflow.
        assert!(page_past_end(&deep, 20_000).is_none());
        assert!(page_past_end(&SearchQuery::all(1), 0).is_some());
    }

    #[test]
    fn test_parse_bulk_response_item_count_mismatch() {
        let records = vec![record("u-1"), record("u-2")];
        let body = json!({ "items": [{ "index": { "status": 201 } }] });

        assert!(parse_bulk_response(&body, &records).is_err());
    }
}
