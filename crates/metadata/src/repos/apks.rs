//! Package record repository trait.

use crate::error::MetadataResult;
use crate::models::{ApkDraft, ApkPatch, ApkRow};
use async_trait::async_trait;

/// Repository for package records.
///
/// List order is id ascending, so offset/limit windows are stable across
/// calls against unchanged data.
#[async_trait]
pub trait ApkRepo: Send + Sync {
    /// Create a package record. The store assigns the id.
    async fn create_apk(&self, draft: &ApkDraft) -> MetadataResult<ApkRow>;

    /// Get a package record by id.
    async fn get_apk(&self, id: i64) -> MetadataResult<Option<ApkRow>>;

    /// Get the first package record matching a name.
    ///
    /// `name` is not unique; when duplicates exist the lowest-id row wins.
    async fn get_first_apk_by_name(&self, name: &str) -> MetadataResult<Option<ApkRow>>;

    /// List package records, id ascending.
    async fn list_apks(&self, offset: i64, limit: i64) -> MetadataResult<Vec<ApkRow>>;

    /// Count all package records, ignoring offset/limit.
    async fn count_apks(&self) -> MetadataResult<i64>;

    /// Apply a partial update. Only fields present in the patch are written;
    /// absent fields keep their prior values. Returns the updated row, or
    /// NotFound if no record has this id.
    async fn update_apk(&self, id: i64, patch: &ApkPatch) -> MetadataResult<ApkRow>;

    /// Delete a package record. Returns NotFound if no record has this id.
    async fn delete_apk(&self, id: i64) -> MetadataResult<()>;
}
