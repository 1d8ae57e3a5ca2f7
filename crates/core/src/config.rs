//! Configuration types shared across crates.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Server configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address (e.g., "0.0.0.0:8000").
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Path to the static index page served at GET /.
    #[serde(default = "default_index_path")]
    pub index_path: PathBuf,
    /// Default page size for list endpoints when the caller omits `limit`.
    #[serde(default = "default_page_limit")]
    pub default_page_limit: u32,
    /// Hard cap on `limit` to keep a single response bounded.
    #[serde(default = "default_max_page_limit")]
    pub max_page_limit: u32,
}

fn default_bind() -> String {
    "127.0.0.1:8000".to_string()
}

fn default_index_path() -> PathBuf {
    PathBuf::from("static/index.html")
}

fn default_page_limit() -> u32 {
    100
}

fn default_max_page_limit() -> u32 {
    1000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            index_path: default_index_path(),
            default_page_limit: default_page_limit(),
            max_page_limit: default_max_page_limit(),
        }
    }
}

impl ServerConfig {
    /// Validate server configuration invariants.
    pub fn validate(&self) -> Result<(), String> {
        if self.default_page_limit == 0 {
            return Err("server.default_page_limit cannot be 0".to_string());
        }
        if self.max_page_limit < self.default_page_limit {
            return Err(format!(
                "server.max_page_limit {} is smaller than default_page_limit {}",
                self.max_page_limit, self.default_page_limit
            ));
        }
        Ok(())
    }
}

/// API key configuration.
///
/// A single process-wide secret gates all mutating endpoints. There is no
/// per-endpoint scoping, expiry, or hashing; callers supply the key verbatim
/// in the `x-api-key` header (or the `key` query parameter for the index page).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ApiConfig {
    /// The shared API key. Must be non-empty.
    /// WARNING: Prefer the APKREG_API__KEY env var over storing this in config files.
    pub key: String,
}

impl ApiConfig {
    /// Validate API configuration invariants.
    pub fn validate(&self) -> Result<(), String> {
        if self.key.is_empty() {
            return Err("api.key cannot be empty".to_string());
        }
        Ok(())
    }

    /// Create a test configuration with a dummy key.
    ///
    /// **For testing only.**
    pub fn for_testing() -> Self {
        Self {
            key: "test-api-key".to_string(),
        }
    }
}

/// PostgreSQL SSL mode configuration.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PgSslMode {
    /// Disable SSL/TLS entirely.
    Disable,
    /// Prefer SSL/TLS but allow unencrypted connections (default).
    #[default]
    Prefer,
    /// Require SSL/TLS for all connections.
    Require,
}

/// Metadata store configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum MetadataConfig {
    /// SQLite database (recommended for testing and small deployments only).
    Sqlite {
        /// Database file path.
        path: PathBuf,
    },
    /// PostgreSQL database.
    Postgres {
        /// Connection URL (optional if using individual fields).
        /// Takes precedence over individual fields if both are provided.
        url: Option<String>,
        /// Database host (e.g., "localhost" or "db.example.com").
        host: Option<String>,
        /// Database port (default: 5432).
        #[serde(default = "default_pg_port")]
        port: Option<u16>,
        /// Database username.
        username: Option<String>,
        /// Database password.
        /// WARNING: Prefer the APKREG_METADATA__PASSWORD env var over storing in config.
        password: Option<String>,
        /// Database name.
        database: Option<String>,
        /// SSL mode for connections.
        ssl_mode: Option<PgSslMode>,
        /// Maximum connections in the pool.
        #[serde(default = "default_max_connections")]
        max_connections: u32,
        /// Statement timeout in milliseconds (prevents hung queries).
        #[serde(default = "default_statement_timeout_ms")]
        statement_timeout_ms: Option<u64>,
    },
}

fn default_max_connections() -> u32 {
    10
}

fn default_pg_port() -> Option<u16> {
    Some(5432)
}

fn default_statement_timeout_ms() -> Option<u64> {
    Some(30000)
}

impl Default for MetadataConfig {
    fn default() -> Self {
        Self::Sqlite {
            path: PathBuf::from("./data/apkreg.db"),
        }
    }
}

impl MetadataConfig {
    /// Validate metadata configuration invariants.
    pub fn validate(&self) -> Result<(), String> {
        match self {
            MetadataConfig::Sqlite { .. } => Ok(()),
            MetadataConfig::Postgres {
                url,
                host,
                database,
                ..
            } => {
                // Must have either url OR (host + database)
                match (url.as_ref(), host.as_ref(), database.as_ref()) {
                    (Some(_), _, _) => Ok(()),
                    (None, Some(_), Some(_)) => Ok(()),
                    (None, None, _) => Err(
                        "postgres config requires either 'url' or 'host' + 'database'".to_string(),
                    ),
                    (None, Some(_), None) => Err(
                        "postgres config requires 'database' when using individual fields"
                            .to_string(),
                    ),
                }
            }
        }
    }
}

/// Complete application configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Metadata store configuration.
    #[serde(default)]
    pub metadata: MetadataConfig,
    /// API key configuration (required).
    pub api: ApiConfig,
}

impl AppConfig {
    /// Create a test configuration with sensible defaults.
    ///
    /// **For testing only.** Uses SQLite metadata and a dummy API key.
    pub fn for_testing() -> Self {
        Self {
            server: ServerConfig::default(),
            metadata: MetadataConfig::default(),
            api: ApiConfig::for_testing(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_config_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.bind, "127.0.0.1:8000");
        assert_eq!(config.default_page_limit, 100);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_server_config_rejects_zero_page_limit() {
        let config = ServerConfig {
            default_page_limit: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_server_config_rejects_inverted_limits() {
        let config = ServerConfig {
            default_page_limit: 100,
            max_page_limit: 10,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_api_config_rejects_empty_key() {
        let config = ApiConfig { key: String::new() };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_metadata_config_postgres_requires_url_or_host() {
        let json = r#"{"type":"postgres"}"#;
        let config: MetadataConfig = serde_json::from_str(json).unwrap();
        assert!(config.validate().is_err());

        let json = r#"{"type":"postgres","host":"localhost","database":"apkreg"}"#;
        let config: MetadataConfig = serde_json::from_str(json).unwrap();
        assert!(config.validate().is_ok());

        let json = r#"{"type":"postgres","host":"localhost"}"#;
        let config: MetadataConfig = serde_json::from_str(json).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_metadata_config_postgres_defaults() {
        let json = r#"{"type":"postgres","url":"postgresql://localhost/apkreg"}"#;
        let config: MetadataConfig = serde_json::from_str(json).unwrap();
        match config {
            MetadataConfig::Postgres {
                port,
                max_connections,
                ssl_mode,
                ..
            } => {
                assert_eq!(port, Some(5432));
                assert_eq!(max_connections, 10);
                assert!(ssl_mode.is_none());
            }
            _ => panic!("expected postgres config"),
        }
    }

    #[test]
    fn test_pg_ssl_mode_deserializes_lowercase() {
        let mode: PgSslMode = serde_json::from_str(r#""require""#).unwrap();
        assert_eq!(mode, PgSslMode::Require);
    }
}
