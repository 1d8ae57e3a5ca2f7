//! Metadata store trait and the SQLite implementation.

use crate::error::{MetadataError, MetadataResult};
use crate::models::{
    ApkDraft, ApkPatch, ApkRow, BundleCorrDraft, BundleCorrPatch, BundleCorrRow,
};
use crate::repos::{ApkRepo, BundleCorrRepo};
use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

/// SQLite schema (embedded).
const SQLITE_SCHEMA: &str = include_str!("sqlite_schema.sql");

/// Combined metadata store trait.
#[async_trait]
pub trait MetadataStore: ApkRepo + BundleCorrRepo + Send + Sync {
    /// Ensure the schema exists (idempotent, never destructive).
    async fn migrate(&self) -> MetadataResult<()>;

    /// Check database connectivity and health.
    async fn health_check(&self) -> MetadataResult<()>;
}

/// SQLite-based metadata store.
pub struct SqliteStore {
    pool: Pool<Sqlite>,
}

impl SqliteStore {
    /// Create a new SQLite store.
    pub async fn new(path: impl AsRef<Path>) -> MetadataResult<Self> {
        let path = path.as_ref();

        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let opts = SqliteConnectOptions::from_str(&format!("sqlite:{}?mode=rwc", path.display()))?
            .create_if_missing(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
            .synchronous(sqlx::sqlite::SqliteSynchronous::Normal)
            // Prevent transient "database is locked" errors under concurrent access.
            .busy_timeout(Duration::from_secs(5));

        let pool = SqlitePoolOptions::new()
            // SQLite permits limited write concurrency; a single connection avoids
            // persistent "database is locked" failures under test/axum concurrency.
            .max_connections(1)
            .connect_with(opts)
            .await?;

        let store = Self { pool };
        store.migrate().await?;

        Ok(store)
    }

    /// Get a reference to the connection pool.
    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }
}

#[async_trait]
impl MetadataStore for SqliteStore {
    async fn migrate(&self) -> MetadataResult<()> {
        for statement in crate::schema_statements(SQLITE_SCHEMA) {
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
impl ApkRepo for SqliteStore {
    async fn create_apk(&self, draft: &ApkDraft) -> MetadataResult<ApkRow> {
        let row = sqlx::query_as::<_, ApkRow>(
            "INSERT INTO allapk (name, vers, isdismiss, description) VALUES (?, ?, ?, ?) RETURNING *",
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
        let row = sqlx::query_as::<_, ApkRow>("SELECT * FROM allapk WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn get_first_apk_by_name(&self, name: &str) -> MetadataResult<Option<ApkRow>> {
        let row = sqlx::query_as::<_, ApkRow>(
            "SELECT * FROM allapk WHERE name = ? ORDER BY id LIMIT 1",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn list_apks(&self, offset: i64, limit: i64) -> MetadataResult<Vec<ApkRow>> {
        let rows = sqlx::query_as::<_, ApkRow>(
            "SELECT * FROM allapk ORDER BY id LIMIT ? OFFSET ?",
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
        // Read-merge-write inside one transaction so the exclude-unset merge
        // is atomic; the pool's single connection serializes writers.
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, ApkRow>("SELECT * FROM allapk WHERE id = ?")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;

        let mut row = row.ok_or_else(|| MetadataError::NotFound(format!("apk id {id} not found")))?;
        patch.apply(&mut row);

        sqlx::query(
            "UPDATE allapk SET name = ?, vers = ?, isdismiss = ?, description = ? WHERE id = ?",
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
        let result = sqlx::query("DELETE FROM allapk WHERE id = ?")
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
impl BundleCorrRepo for SqliteStore {
    async fn create_corr(&self, draft: &BundleCorrDraft) -> MetadataResult<BundleCorrRow> {
        let row = sqlx::query_as::<_, BundleCorrRow>(
            "INSERT INTO bundlecorr (bundle, project, platform) VALUES (?, ?, ?) RETURNING *",
        )
        .bind(&draft.bundle)
        .bind(&draft.project)
        .bind(&draft.platform)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn get_corr(&self, id: i64) -> MetadataResult<Option<BundleCorrRow>> {
        let row = sqlx::query_as::<_, BundleCorrRow>("SELECT * FROM bundlecorr WHERE id = ?")
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
            "SELECT * FROM bundlecorr WHERE bundle = ? ORDER BY id LIMIT 1",
        )
        .bind(bundle)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn list_corrs(&self, offset: i64, limit: i64) -> MetadataResult<Vec<BundleCorrRow>> {
        let rows = sqlx::query_as::<_, BundleCorrRow>(
            "SELECT * FROM bundlecorr ORDER BY id LIMIT ? OFFSET ?",
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

        let row = sqlx::query_as::<_, BundleCorrRow>("SELECT * FROM bundlecorr WHERE id = ?")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;

        let mut row =
            row.ok_or_else(|| MetadataError::NotFound(format!("correlation id {id} not found")))?;
        patch.apply(&mut row);

        sqlx::query("UPDATE bundlecorr SET bundle = ?, project = ?, platform = ? WHERE id = ?")
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
        let result = sqlx::query("DELETE FROM bundlecorr WHERE id = ?")
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
