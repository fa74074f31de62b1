//! Error types for the ingestion pipeline.

use user_search_repository::SearchError;
use thiserror::Error;

/// Errors that can occur in the ingestion pipeline.
#[derive(Error, Debug)]
pub enum IngestError {
    /// The index could not be reset; nothing was ingested.
    #[error("Index setup error: {0}")]
    IndexSetupError(#[source] SearchError),

    /// A chunk submission failed unexpectedly and the run was aborted.
    #[error("Bulk ingestion aborted at chunk {chunk} after {ingested} records: {source}")]
    BulkAborted {
        /// 1-based number of the chunk that failed.
        chunk: usize,
        /// Records successfully written before the failure.
        ingested: usize,
        /// The engine error.
        #[source]
        source: SearchError,
    },

    /// Invalid pipeline configuration.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Error from the search engine.
    #[error("Search error: {0}")]
    SearchError(#[from] SearchError),
}

impl IngestError {
    /// Create an index setup error.
    pub fn index_setup(err: SearchError) -> Self {
        Self::IndexSetupError(err)
    }

    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }
}
