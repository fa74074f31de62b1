//! # User Search Ingest
//!
//! This crate provides the ingestion pipeline that (re)builds the user index
//! and bulk-loads synthetic records into it.
//!
//! ## Architecture
//!
//! 1. **Generator**: Produces a lazy, finite stream of synthetic records
//! 2. **Index**: Drops and recreates the index with the fixed schema
//! 3. **Loader**: Writes the stream in fixed-size bulk chunks, accounting failures
//! 4. **Orchestrator**: Coordinates the run and reports throughput

pub mod errors;
pub mod generator;
pub mod index;
pub mod loader;
pub mod orchestrator;

pub use errors::IngestError;
pub use generator::{generate_data_stream, SyntheticRecords};
pub use index::create_index;
pub use loader::{BulkLoader, IngestConfig, IngestReport};
pub use orchestrator::Orchestrator;
