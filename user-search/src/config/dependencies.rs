//! Dependency initialization and wiring for the user search service.

use std::sync::Arc;
use tracing::info;

use crate::config::{Backend, Settings};
use crate::AppError;
use user_search_repository::{InMemorySearchEngine, OpenSearchClient, SearchEngineClient};

/// Container for all initialized dependencies.
pub struct Dependencies {
    /// The engine client shared by every component.
    pub client: Arc<dyn SearchEngineClient>,
    /// Settings the dependencies were built from.
    pub settings: Settings,
}

impl Dependencies {
    /// Build the engine client selected by `settings` and verify it is healthy.
    ///
    /// # Returns
    ///
    /// * `Ok(Dependencies)` - Initialized dependencies
    /// * `Err(AppError)` - If the client cannot be created or the engine is unhealthy
    pub async fn new(settings: Settings) -> Result<Self, AppError> {
        info!(
            backend = ?settings.backend,
            opensearch_url = %settings.opensearch_url,
            index = %settings.index,
            "Initializing dependencies"
        );

        let client: Arc<dyn SearchEngineClient> = match settings.backend {
            Backend::OpenSearch => {
                let client = OpenSearchClient::new(&settings.opensearch_url)
                    .await
                    .map_err(|e| {
                        AppError::config(format!("Failed to create OpenSearch client: {}", e))
                    })?;
                Arc::new(client)
            }
            Backend::Memory => Arc::new(InMemorySearchEngine::new()),
        };

        // Verify the engine is reachable
        let healthy = client
            .health_check()
            .await
            .map_err(|e| AppError::config(format!("Search engine health check failed: {}", e)))?;

        if !healthy {
            return Err(AppError::config("Search engine cluster is unhealthy"));
        }

        info!("Search engine connection verified");

        Ok(Self { client, settings })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_backend() {
        let settings = Settings {
            opensearch_url: "http://localhost:9200".to_string(),
            index: "users".to_string(),
            bind_addr: "127.0.0.1:0".to_string(),
            backend: Backend::Memory,
            log_format: Default::default(),
        };

        let deps = Dependencies::new(settings).await.unwrap();

        assert!(!deps.client.index_exists("users").await.unwrap());
        assert_eq!(deps.settings.index, "users");
    }
}
