//! PostgreSQL-based metadata store implementation.

use crate::error::{MetadataError, MetadataResult};
use crate::models::{
    ApkDraft, ApkPatch, ApkRow, BundleCorrDraft, BundleCorrPatch, BundleCorrRow,
};
use crate::repos::{ApkRepo, BundleCorrRepo};
use crate::store::MetadataStore;
use apkreg_core::config::PgSslMode;
use async_trait::async_trait;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions, PgSslMode as SqlxPgSslMode};
use sqlx::{Pool, Postgres};
use std::str::FromStr;

/// PostgreSQL schema (embedded).
const POSTGRES_SCHEMA: &str = include_str!("postgres_schema.sql");

/// PostgreSQL-based metadata store.
pub struct PostgresStore {
    pool: Pool<Postgres>,
}

impl PostgresStore {
    /// Create a new PostgreSQL store from a connection URL.
    pub async fn from_url(
        url: &str,
        max_connections: u32,
        statement_timeout_ms: Option<u64>,
    ) -> MetadataResult<Self> {
        let opts = PgConnectOptions::from_str(url)?;
        Self::connect(opts, max_connections, statement_timeout_ms).await
    }

    /// Create a new PostgreSQL store from individual connection parameters.
    ///
    /// This allows credentials to be passed separately, enabling better
    /// secret management (e.g., passwords via environment variables).
    pub async fn from_params(
        host: &str,
        port: u16,
        username: Option<&str>,
        password: Option<&str>,
        database: &str,
        ssl_mode: Option<PgSslMode>,
        max_connections: u32,
        statement_timeout_ms: Option<u64>,
    ) -> MetadataResult<Self> {
        let mut opts = PgConnectOptions::new()
            .host(host)
            .port(port)
            .database(database);

        if let Some(user) = username {
            opts = opts.username(user);
        }

        if let Some(pass) = password {
            opts = opts.password(pass);
        }

        if let Some(mode) = ssl_mode {
            let sqlx_mode = match mode {
                PgSslMode::Disable => SqlxPgSslMode::Disable,
                PgSslMode::Prefer => SqlxPgSslMode::Prefer,
                PgSslMode::Require => SqlxPgSslMode::Require,
            };
            opts = opts.ssl_mode(sqlx_mode);
        }

        // Log connection info without password
        tracing::info!(
            host = host,
            port = port,
            database = database,
            username = username.unwrap_or("<none>"),
            ssl_mode = ?ssl_mode,
            "Connecting to PostgreSQL with individual parameters"
        );

        Self::connect(opts, max_connections, statement_timeout_ms).await
    }

    /// Internal: Connect to PostgreSQL with the given options.
    async fn connect(
        mut opts: PgConnectOptions,
        max_connections: u32,
        statement_timeout_ms: Option<u64>,
    ) -> MetadataResult<Self> {
        // Set statement_timeout if configured to prevent hung queries.
        if let Some(timeout_ms) = statement_timeout_ms {
            opts = opts.options([("statement_timeout", format!("{}ms", timeout_ms))]);
            tracing::info!("PostgreSQL statement_timeout set to {}ms", timeout_ms);
        }

        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect_with(opts)
            .await?;

        let store = Self { pool };
        store.migrate().await?;

        Ok(store)
    }

    /// Get a reference to the connection pool.
    pub fn pool(&self) -> &Pool<Postgres> {
        &self.pool
    }
}

#[async_trait]
impl MetadataStore for PostgresStore {
    async fn migrate(&self) -> MetadataResult<()> {
        // PostgreSQL doesn't allow multiple statements in a single prepared
        // statement, so the schema is split and executed statement by statement.
        for statement in crate::schema_statements(POSTGRES_SCHEMA) {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        Ok(())
    }

    async fn health_check(&self) -> MetadataResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl ApkRepo for PostgresStore {
    async fn create_apk(&self, draft: &ApkDraft) -> MetadataResult<ApkRow> {
        let row = sqlx::query_as::<_, ApkRow>(
            "INSERT INTO allapk (name, vers, isdismiss, description) VALUES ($1, $2, $3, $4) RETURNING *",
        )
        .bind(&draft.name)
        .bind(draft.vers)
        .bind(draft.isdismiss)
        .bind(&draft.description)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn get_apk(&self, id: i64) -> MetadataResult<Option<ApkRow>> {
        let row = sqlx::query_as::<_, ApkRow>("SELECT * FROM allapk WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn get_first_apk_by_name(&self, name: &str) -> MetadataResult<Option<ApkRow>> {
        let row = sqlx::query_as::<_, ApkRow>(
            "SELECT * FROM allapk WHERE name = $1 ORDER BY id LIMIT 1",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn list_apks(&self, offset: i64, limit: i64) -> MetadataResult<Vec<ApkRow>> {
        let rows = sqlx::query_as::<_, ApkRow>(
            "SELECT * FROM allapk ORDER BY id LIMIT $1 OFFSET $2",
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn count_apks(&self) -> MetadataResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM allapk")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn update_apk(&self, id: i64, patch: &ApkPatch) -> MetadataResult<ApkRow> {
        // Read-merge-write with a row lock so the exclude-unset merge is atomic
        // against concurrent updates to the same id.
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, ApkRow>("SELECT * FROM allapk WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;

        let mut row = row.ok_or_else(|| MetadataError::NotFound(format!("apk id {id} not found")))?;
        patch.apply(&mut row);

        sqlx::query(
            "UPDATE allapk SET name = $1, vers = $2, isdismiss = $3, description = $4 WHERE id = $5",
        )
        .bind(&row.name)
        .bind(row.vers)
        .bind(row.isdismiss)
        .bind(&row.description)
        .bind(id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(row)
    }

    async fn delete_apk(&self, id: i64) -> MetadataResult<()> {
        let result = sqlx::query("DELETE FROM allapk WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(MetadataError::NotFound(format!("apk id {id} not found")));
        }
        Ok(())
    }
}

#[async_trait]
impl BundleCorrRepo for PostgresStore {
    async fn create_corr(&self, draft: &BundleCorrDraft) -> MetadataResult<BundleCorrRow> {
        let row = sqlx::query_as::<_, BundleCorrRow>(
            "INSERT INTO bundlecorr (bundle, project, platform) VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(&draft.bundle)
        .bind(&draft.project)
        .bind(&draft.platform)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn get_corr(&self, id: i64) -> MetadataResult<Option<BundleCorrRow>> {
        let row = sqlx::query_as::<_, BundleCorrRow>("SELECT * FROM bundlecorr WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn get_first_corr_by_bundle(
        &self,
        bundle: &str,
    ) -> MetadataResult<Option<BundleCorrRow>> {
        let row = sqlx::query_as::<_, BundleCorrRow>(
            "SELECT * FROM bundlecorr WHERE bundle = $1 ORDER BY id LIMIT 1",
        )
        .bind(bundle)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn list_corrs(&self, offset: i64, limit: i64) -> MetadataResult<Vec<BundleCorrRow>> {
        let rows = sqlx::query_as::<_, BundleCorrRow>(
            "SELECT * FROM bundlecorr ORDER BY id LIMIT $1 OFFSET $2",
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn count_corrs(&self) -> MetadataResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM bundlecorr")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn update_corr(
        &self,
        id: i64,
        patch: &BundleCorrPatch,
    ) -> MetadataResult<BundleCorrRow> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, BundleCorrRow>(
            "SELECT * FROM bundlecorr WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;

        let mut row =
            row.ok_or_else(|| MetadataError::NotFound(format!("correlation id {id} not found")))?;
        patch.apply(&mut row);

        sqlx::query(
            "UPDATE bundlecorr SET bundle = $1, project = $2, platform = $3 WHERE id = $4",
        )
        .bind(&row.bundle)
        .bind(&row.project)
        .bind(&row.platform)
        .bind(id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(row)
    }

    async fn delete_corr(&self, id: i64) -> MetadataResult<()> {
        let result = sqlx::query("DELETE FROM bundlecorr WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(MetadataError::NotFound(format!(
                "correlation id {id} not found"
            )));
        }
        Ok(())
    }
}
