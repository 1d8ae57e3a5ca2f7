//! Application state shared across handlers.

use apkreg_core::config::AppConfig;
use apkreg_metadata::MetadataStore;
use std::sync::Arc;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<AppConfig>,
    /// Metadata store.
    pub metadata: Arc<dyn MetadataStore>,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Panics
    ///
    /// Panics if configuration validation fails. An empty API key or an
    /// unusable page-limit configuration must stop the server at startup
    /// rather than surface per-request.
    pub fn new(config: AppConfig, metadata: Arc<dyn MetadataStore>) -> Self {
        if let Err(error) = config.server.validate() {
            panic!("Invalid server configuration: {}", error);
        }
        if let Err(error) = config.api.validate() {
            panic!("Invalid API configuration: {}", error);
        }
        if let Err(error) = config.metadata.validate() {
            panic!("Invalid metadata configuration: {}", error);
        }

        Self {
            config: Arc::new(config),
            metadata,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use apkreg_core::config::{AppConfig, MetadataConfig};
    use apkreg_metadata::SqliteStore;
    use tempfile::tempdir;

    async fn build_store(dir: &std::path::Path) -> Arc<dyn MetadataStore> {
        let db_path = dir.join("metadata.db");
        Arc::new(SqliteStore::new(&db_path).await.unwrap())
    }

    #[tokio::test]
    async fn test_state_accepts_valid_config() {
        let temp = tempdir().unwrap();
        let metadata = build_store(temp.path()).await;
        let state = AppState::new(AppConfig::for_testing(), metadata);
        assert_eq!(state.config.api.key, "test-api-key");
    }

    #[tokio::test]
    #[should_panic(expected = "Invalid API configuration")]
    async fn test_state_rejects_empty_api_key() {
        let temp = tempdir().unwrap();
        let metadata = build_store(temp.path()).await;
        let mut config = AppConfig::for_testing();
        config.api.key = String::new();
        let _ = AppState::new(config, metadata);
    }

    #[tokio::test]
    #[should_panic(expected = "Invalid metadata configuration")]
    async fn test_state_rejects_incomplete_postgres_config() {
        let temp = tempdir().unwrap();
        let metadata = build_store(temp.path()).await;
        let mut config = AppConfig::for_testing();
        config.metadata = MetadataConfig::Postgres {
            url: None,
            host: None,
            port: Some(5432),
            username: None,
            password: None,
            database: None,
            ssl_mode: None,
            max_connections: 10,
            statement_timeout_ms: None,
        };
        let _ = AppState::new(config, metadata);
    }
}
