//! Index reset for ingestion runs.

use tracing::{info, instrument, warn};

use crate::errors::IngestError;
use user_search_repository::{IndexSchema, SearchEngineClient};

/// Drop the index if it exists, then create it empty with `schema`.
///
/// This is a destructive reset, not an upsert: every record previously in
/// the index is lost. Any failure leaves the run without a usable index and
/// is returned as [`IngestError::IndexSetupError`].
#[instrument(skip(client, schema))]
pub async fn create_index(
    client: &dyn SearchEngineClient,
    name: &str,
    schema: &IndexSchema,
) -> Result<(), IngestError> {
    let exists = client
        .index_exists(name)
        .await
        .map_err(IngestError::index_setup)?;

    if exists {
        warn!(index = %name, "Index already exists, deleting it");
        client
            .delete_index(name)
            .await
            .map_err(IngestError::index_setup)?;
    }

    info!(index = %name, "Creating index");
    client
        .create_index(name, schema)
        .await
        .map_err(IngestError::index_setup)
}

#[cfg(test)]
mod tests {
    use super::*;
    use user_search_repository::InMemorySearchEngine;
    use user_search_shared::UserRecord;

    #[tokio::test]
    async fn test_creates_missing_index() {
        let engine = InMemorySearchEngine::new();

        create_index(&engine, "users", &IndexSchema::users())
            .await
            .unwrap();

        assert_eq!(engine.document_count("users").await, Some(0));
    }

    #[tokio::test]
    async fn test_recreates_existing_index_empty() {
        let engine = InMemorySearchEngine::new();
        engine
            .create_index("users", &IndexSchema::users())
            .await
            .unwrap();
        engine
            .bulk_write("users", &[UserRecord::new("u", "Ada", "a@b.c", "Peru")])
            .await
            .unwrap();

        create_index(&engine, "users", &IndexSchema::users())
            .await
            .unwrap();

        assert_eq!(engine.document_count("users").await, Some(0));
    }
}
