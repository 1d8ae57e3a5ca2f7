//! Bundle correlation repository trait.

use crate::error::MetadataResult;
use crate::models::{BundleCorrDraft, BundleCorrPatch, BundleCorrRow};
use async_trait::async_trait;

/// Repository for bundle/project/platform correlation records.
#[async_trait]
pub trait BundleCorrRepo: Send + Sync {
    /// Create a correlation record. The store assigns the id.
    async fn create_corr(&self, draft: &BundleCorrDraft) -> MetadataResult<BundleCorrRow>;

    /// Get a correlation record by id.
    async fn get_corr(&self, id: i64) -> MetadataResult<Option<BundleCorrRow>>;

    /// Get the first correlation record matching a bundle identifier.
    /// The lowest-id row wins when duplicates exist.
    async fn get_first_corr_by_bundle(&self, bundle: &str)
    -> MetadataResult<Option<BundleCorrRow>>;

    /// List correlation records, id ascending.
    async fn list_corrs(&self, offset: i64, limit: i64) -> MetadataResult<Vec<BundleCorrRow>>;

    /// Count all correlation records.
    async fn count_corrs(&self) -> MetadataResult<i64>;

    /// Apply a partial update; absent fields keep their prior values.
    async fn update_corr(&self, id: i64, patch: &BundleCorrPatch)
    -> MetadataResult<BundleCorrRow>;

    /// Delete a correlation record. Returns NotFound if no record has this id.
    async fn delete_corr(&self, id: i64) -> MetadataResult<()>;
}
