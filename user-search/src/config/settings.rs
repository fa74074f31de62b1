//! Settings read from the environment.

use std::env;
use std::str::FromStr;

use crate::AppError;

/// Default OpenSearch URL.
const DEFAULT_OPENSEARCH_URL: &str = "http://localhost:9200";

/// Default index name.
const DEFAULT_INDEX: &str = "users";

/// Default HTTP bind address.
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8000";

/// Which search engine implementation to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Backend {
    /// A remote OpenSearch cluster.
    #[default]
    OpenSearch,
    /// The in-process engine; data lives only as long as the process.
    Memory,
}

impl FromStr for Backend {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "opensearch" | "elasticsearch" => Ok(Self::OpenSearch),
            "memory" => Ok(Self::Memory),
            other => Err(AppError::config(format!(
                "unknown SEARCH_BACKEND '{}', expected 'opensearch' or 'memory'",
                other
            ))),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Pretty,
    /// One JSON object per event.
    Json,
}

impl FromStr for LogFormat {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" | "text" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(AppError::config(format!(
                "unknown LOG_FORMAT '{}', expected 'pretty' or 'json'",
                other
            ))),
        }
    }
}

/// Service settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// OpenSearch server URL.
    pub opensearch_url: String,
    /// Index holding the user records.
    pub index: String,
    /// Address the HTTP server binds to.
    pub bind_addr: String,
    /// Engine implementation.
    pub backend: Backend,
    /// Log output format.
    pub log_format: LogFormat,
}

impl Settings {
    /// Read settings from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `OPENSEARCH_URL`: OpenSearch server URL (default: http://localhost:9200)
    /// - `SEARCH_INDEX`: Index name (default: users)
    /// - `BIND_ADDR`: HTTP bind address (default: 0.0.0.0:8000)
    /// - `SEARCH_BACKEND`: `opensearch` or `memory` (default: opensearch)
    /// - `LOG_FORMAT`: `pretty` or `json` (default: pretty)
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let or_default = |key: &str, default: &str| {
            lookup(key)
                .filter(|value| !value.trim().is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        let backend = lookup("SEARCH_BACKEND")
            .filter(|value| !value.trim().is_empty())
            .map(|value| value.parse::<Backend>())
            .transpose()?
            .unwrap_or_default();
        let log_format = lookup("LOG_FORMAT")
            .filter(|value| !value.trim().is_empty())
            .map(|value| value.parse::<LogFormat>())
            .transpose()?
            .unwrap_or_default();

        Ok(Self {
            opensearch_url: or_default("OPENSEARCH_URL", DEFAULT_OPENSEARCH_URL),
            index: or_default("SEARCH_INDEX", DEFAULT_INDEX),
            bind_addr: or_default("BIND_ADDR", DEFAULT_BIND_ADDR),
            backend,
            log_format,
        })
    }
}
