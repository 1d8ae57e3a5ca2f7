//! Shared configuration for the apkreg package-version registry.
//!
//! This crate defines the configuration surface consumed by the other crates:
//! - Server bind address, index page path, and paging limits
//! - Metadata store selection (SQLite or PostgreSQL with SSL mode)
//! - The process-wide API key gating mutations

pub mod config;

pub use config::{ApiConfig, AppConfig, MetadataConfig, PgSslMode, ServerConfig};
