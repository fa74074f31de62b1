//! # User Search API
//!
//! HTTP surface of the user search service.
//!
//! ## Endpoints
//!
//! - `GET /`: liveness message
//! - `POST /search`: one relevance-ranked page of 15 records
//! - `POST /download`: every matching record as NDJSON, read from a
//!   point-in-time snapshot and streamed without buffering the result set

pub mod errors;
pub mod export;
pub mod routes;
pub mod search;

#[cfg(test)]
mod testing;

pub use errors::ApiError;
pub use export::{ExportConfig, ExportSession, SnapshotGuard};
pub use routes::{router, serve, AppState};
pub use search::search_users;
