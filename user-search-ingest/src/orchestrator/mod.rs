//! Orchestrator module for the ingestion pipeline.
//!
//! Coordinates index setup, record generation and the bulk loader.

use std::sync::Arc;
use std::time::Instant;

use tracing::{info, instrument};

use crate::errors::IngestError;
use crate::generator::generate_data_stream;
use crate::index::create_index;
use crate::loader::{BulkLoader, IngestConfig, IngestReport};
use user_search_repository::{IndexSchema, SearchEngineClient};
use user_search_shared::UserRecord;

/// Orchestrator that runs one complete ingestion.
///
/// A run always starts from an empty index: the index is dropped and
/// recreated before the first record is written.
pub struct Orchestrator {
    client: Arc<dyn SearchEngineClient>,
    index: String,
    schema: IndexSchema,
    config: IngestConfig,
}

impl Orchestrator {
    /// Create a new orchestrator for `index` with the users schema.
    pub fn new(client: Arc<dyn SearchEngineClient>, index: impl Into<String>) -> Self {
        Self::with_config(client, index, IngestConfig::default())
    }

    /// Create a new orchestrator with custom loader configuration.
    pub fn with_config(
        client: Arc<dyn SearchEngineClient>,
        index: impl Into<String>,
        config: IngestConfig,
    ) -> Self {
        Self {
            client,
            index: index.into(),
            schema: IndexSchema::users(),
            config,
        }
    }

    /// Reset the index and load `count` freshly generated records.
    #[instrument(skip(self), fields(index = %self.index))]
    pub async fn run(&self, count: usize) -> Result<IngestReport, IngestError> {
        self.run_with(generate_data_stream(count)).await
    }

    /// Reset the index and load the given records.
    pub async fn run_with<I>(&self, records: I) -> Result<IngestReport, IngestError>
    where
        I: IntoIterator<Item = UserRecord>,
    {
        let start = Instant::now();
        info!(index = %self.index, "Starting ingestion");

        create_index(self.client.as_ref(), &self.index, &self.schema).await?;

        let loader =
            BulkLoader::with_config(self.client.clone(), self.index.clone(), self.config.clone());
        let report = loader.bulk_ingest(records).await?;

        report.log_summary();
        info!(
            total_secs = start.elapsed().as_secs_f64(),
            "Total time taken"
        );

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::SyntheticRecords;
    use std::time::Duration;
    use user_search_repository::InMemorySearchEngine;

    fn config() -> IngestConfig {
        IngestConfig {
            chunk_size: 100,
            chunk_timeout: Duration::from_secs(5),
        }
    }

    #[tokio::test]
    async fn test_run_loads_generated_records() {
        let engine = Arc::new(InMemorySearchEngine::new());
        let orchestrator = Orchestrator::with_config(engine.clone(), "users", config());

        let report = orchestrator.run(250).await.unwrap();

        assert_eq!(report.successes, 250);
        assert!(report.failures.is_empty());
        assert_eq!(report.chunks, 3);
        assert_eq!(engine.document_count("users").await, Some(250));
    }

    #[tokio::test]
    async fn test_run_replaces_previous_contents() {
        let engine = Arc::new(InMemorySearchEngine::new());
        let orchestrator = Orchestrator::with_config(engine.clone(), "users", config());

        orchestrator
            .run_with(SyntheticRecords::seeded(300, 1))
            .await
            .unwrap();
        orchestrator
            .run_with(SyntheticRecords::seeded(40, 2))
            .await
            .unwrap();

        assert_eq!(engine.document_count("users").await, Some(40));
    }

    #[tokio::test]
    async fn test_run_with_zero_records_leaves_empty_index() {
        let engine = Arc::new(InMemorySearchEngine::new());
        let orchestrator = Orchestrator::new(engine.clone(), "users");

        let report = orchestrator.run(0).await.unwrap();

        assert_eq!(report.total(), 0);
        assert_eq!(engine.document_count("users").await, Some(0));
    }
}
