//! Loader module for the ingestion pipeline.
//!
//! Consumes a record stream in fixed-size chunks and writes each chunk with
//! one bulk request.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, error, info, instrument, warn};

use crate::errors::IngestError;
use user_search_repository::{BulkFailure, SearchEngineClient};
use user_search_shared::UserRecord;

/// Configuration for the bulk loader.
#[derive(Debug, Clone)]
pub struct IngestConfig {
    /// Number of records per bulk request.
    pub chunk_size: usize,
    /// Maximum time to wait for one bulk request.
    pub chunk_timeout: Duration,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            chunk_timeout: Duration::from_secs(200),
        }
    }
}

/// Outcome of an ingestion run.
#[derive(Debug, Clone, Default)]
pub struct IngestReport {
    /// Records written.
    pub successes: usize,
    /// Records rejected by the engine or lost to a chunk timeout.
    pub failures: Vec<BulkFailure>,
    /// Bulk requests submitted.
    pub chunks: usize,
    /// Wall time spent writing.
    pub elapsed: Duration,
}

impl IngestReport {
    /// Records submitted, successful or not.
    pub fn total(&self) -> usize {
        self.successes + self.failures.len()
    }

    /// Successful records per second.
    pub fn throughput(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.successes as f64 / secs
        } else {
            0.0
        }
    }

    fn fail_chunk(&mut self, chunk: &[UserRecord], reason: &str) {
        self.failures
            .extend(chunk.iter().map(|record| BulkFailure {
                user_id: record.user_id.clone(),
                status: None,
                reason: reason.to_string(),
            }));
    }
}

/// Loader that writes records into the search index in bulk.
///
/// The loader is responsible for:
/// - Chunking an arbitrarily long record stream to bound memory and request size
/// - Accounting per-record failures without aborting the run
/// - Treating a chunk timeout as a failure of that chunk only
///
/// Failed records are reported, never retried.
pub struct BulkLoader {
    client: Arc<dyn SearchEngineClient>,
    index: String,
    config: IngestConfig,
}

impl BulkLoader {
    /// Create a new loader for the given index with default configuration.
    pub fn new(client: Arc<dyn SearchEngineClient>, index: impl Into<String>) -> Self {
        Self::with_config(client, index, IngestConfig::default())
    }

    /// Create a new loader with custom configuration.
    pub fn with_config(
        client: Arc<dyn SearchEngineClient>,
        index: impl Into<String>,
        config: IngestConfig,
    ) -> Self {
        Self {
            client,
            index: index.into(),
            config,
        }
    }

    /// Write every record of `records` into the index.
    ///
    /// # Returns
    ///
    /// * `Ok(IngestReport)` - Successes and per-record failures
    /// * `Err(IngestError::BulkAborted)` - If a chunk submission failed with
    ///   anything other than a timeout; remaining records are not consumed
    #[instrument(skip(self, records), fields(index = %self.index, chunk_size = self.config.chunk_size))]
    pub async fn bulk_ingest<I>(&self, records: I) -> Result<IngestReport, IngestError>
    where
        I: IntoIterator<Item = UserRecord>,
    {
        if self.config.chunk_size == 0 {
            return Err(IngestError::config("chunk_size must be greater than zero"));
        }

        let start = Instant::now();
        let mut report = IngestReport::default();
        let mut chunk = Vec::with_capacity(self.config.chunk_size);

        for record in records {
            chunk.push(record);
            if chunk.len() == self.config.chunk_size {
                self.submit_chunk(&chunk, &mut report).await?;
                chunk.clear();
            }
        }
        if !chunk.is_empty() {
            self.submit_chunk(&chunk, &mut report).await?;
        }

        report.elapsed = start.elapsed();
        Ok(report)
    }

    async fn submit_chunk(
        &self,
        chunk: &[UserRecord],
        report: &mut IngestReport,
    ) -> Result<(), IngestError> {
        report.chunks += 1;
        let number = report.chunks;

        let write = self.client.bulk_write(&self.index, chunk);
        match tokio::time::timeout(self.config.chunk_timeout, write).await {
            Ok(Ok(summary)) => {
                debug!(
                    chunk = number,
                    succeeded = summary.succeeded,
                    failed = summary.failures.len(),
                    "Chunk written"
                );
                if !summary.failures.is_empty() {
                    warn!(
                        chunk = number,
                        failed = summary.failures.len(),
                        "Engine rejected records in chunk"
                    );
                }
                report.successes += summary.succeeded;
                report.failures.extend(summary.failures);
                Ok(())
            }
            Ok(Err(e)) if e.is_timeout() => {
                warn!(chunk = number, records = chunk.len(), error = %e, "Chunk timed out");
                report.fail_chunk(chunk, &e.to_string());
                Ok(())
            }
            Err(_) => {
                warn!(
                    chunk = number,
                    records = chunk.len(),
                    timeout_secs = self.config.chunk_timeout.as_secs_f64(),
                    "Chunk timed out"
                );
                let reason = format!(
                    "bulk request timed out after {:?}",
                    self.config.chunk_timeout
                );
                report.fail_chunk(chunk, &reason);
                Ok(())
            }
            Ok(Err(e)) => {
                error!(chunk = number, error = %e, "Bulk request failed, aborting ingestion");
                Err(IngestError::BulkAborted {
                    chunk: number,
                    ingested: report.successes,
                    source: e,
                })
            }
        }
    }
}

impl IngestReport {
    /// Log the outcome of a run.
    pub fn log_summary(&self) {
        info!(
            successes = self.successes,
            failures = self.failures.len(),
            chunks = self.chunks,
            elapsed_secs = self.elapsed.as_secs_f64(),
            records_per_sec = self.throughput(),
            "Ingestion finished"
        );
        if let Some(first) = self.failures.first() {
            warn!(
                failures = self.failures.len(),
                first_user_id = %first.user_id,
                first_reason = %first.reason,
                "Some records failed to ingest"
            );
        }
    }
}
