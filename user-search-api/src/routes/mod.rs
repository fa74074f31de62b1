//! HTTP routes.

use std::future::Future;
use std::sync::Arc;

use axum::body::Body;
use axum::extract::State;
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tracing::info;

use crate::errors::ApiError;
use crate::export::{ExportConfig, ExportSession};
use crate::search::search_users;
use user_search_repository::SearchEngineClient;
use user_search_shared::{RecordFilter, SearchPage};

/// Media type of export responses.
pub const NDJSON_CONTENT_TYPE: &str = "application/x-ndjson";

/// `Content-Disposition` of export responses.
pub const EXPORT_DISPOSITION: &str = "attachment; filename=user_results.jsonl";

/// Shared state of the HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    /// Engine client shared by every request.
    pub client: Arc<dyn SearchEngineClient>,
    /// Index that is searched and exported.
    pub index: Arc<str>,
    /// Export tuning.
    pub export: ExportConfig,
}

impl AppState {
    /// Create state for `index` with the default export configuration.
    pub fn new(client: Arc<dyn SearchEngineClient>, index: impl Into<Arc<str>>) -> Self {
        Self {
            client,
            index: index.into(),
            export: ExportConfig::default(),
        }
    }
}

#[derive(Debug, Serialize)]
struct RootResponse {
    message: &'static str,
}

/// Body of `POST /search`. A request without a body uses the defaults.
#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    /// Query text; empty or absent matches everything.
    #[serde(default)]
    pub query: Option<String>,
    /// 1-based page number.
    #[serde(default = "first_page")]
    pub page: i64,
}

fn first_page() -> i64 {
    1
}

impl Default for SearchRequest {
    fn default() -> Self {
        Self {
            query: None,
            page: first_page(),
        }
    }
}

/// Body of `POST /download`. A request without a body exports everything.
#[derive(Debug, Default, Deserialize)]
pub struct DownloadRequest {
    /// Query text; empty or absent exports everything.
    #[serde(default)]
    pub query: Option<String>,
}

/// Build the API router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/search", post(search))
        .route("/download", post(download))
        .with_state(state)
}

/// Serve the API on `listener` until `shutdown` resolves.
pub async fn serve<F>(listener: TcpListener, state: AppState, shutdown: F) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    info!(addr = ?listener.local_addr().ok(), index = %state.index, "Serving user search API");
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await
}

async fn root() -> Json<RootResponse> {
    Json(RootResponse {
        message: "Hello World",
    })
}

async fn search(
    State(state): State<AppState>,
    request: Option<Json<SearchRequest>>,
) -> Result<Json<SearchPage>, ApiError> {
    let request = request.map(|Json(request)| request).unwrap_or_default();
    info!(query = ?request.query, page = request.page, "Search request");
    let page = search_users(
        state.client.as_ref(),
        &state.index,
        request.query.as_deref(),
        request.page,
    )
    .await?;
    Ok(Json(page))
}

async fn download(
    State(state): State<AppState>,
    request: Option<Json<DownloadRequest>>,
) -> Result<Response, ApiError> {
    let request = request.map(|Json(request)| request).unwrap_or_default();
    info!(query = ?request.query, "Download request");
    let filter = RecordFilter::from_input(request.query.as_deref());
    let session =
        ExportSession::open(state.client.clone(), &state.index, filter, &state.export).await?;

    let headers = [
        (header::CONTENT_TYPE, NDJSON_CONTENT_TYPE),
        (header::CONTENT_DISPOSITION, EXPORT_DISPOSITION),
    ];
    Ok((headers, Body::from_stream(session.ndjson())).into_response())
}
