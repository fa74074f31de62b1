//! # User Search
//!
//! Main library for the user search service.
//!
//! This crate provides the configuration and dependency wiring shared by the
//! `ingest` and `serve` commands of the binary.

pub mod config;

pub use config::{Backend, Dependencies, LogFormat, Settings};

use thiserror::Error;

/// Errors that can occur during service initialization or execution.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Ingestion error.
    #[error("Ingestion error: {0}")]
    IngestError(#[from] user_search_ingest::IngestError),

    /// Search error.
    #[error("Search error: {0}")]
    SearchError(#[from] user_search_repository::SearchError),

    /// IO error.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl AppError {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }
}
