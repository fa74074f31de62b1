//! Error types for the HTTP API.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use tracing::error;

use user_search_repository::SearchError;

/// Errors returned by API handlers.
#[derive(Error, Debug)]
pub enum ApiError {
    /// The request is malformed or out of range.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The search engine failed or is unreachable.
    #[error("Search engine error: {0}")]
    Engine(#[from] SearchError),
}

impl ApiError {
    /// Create an invalid request error.
    pub fn invalid_request(msg: impl Into<String>) -> Self {
        Self::InvalidRequest(msg.into())
    }

    /// HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_) | Self::Engine(SearchError::InvalidQuery(_)) => {
                StatusCode::BAD_REQUEST
            }
            Self::Engine(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self, "Request failed");
        }

        (status, Json(json!({ "detail": self.to_string() }))).into_response()
    }
}
