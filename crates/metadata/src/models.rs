//! Database models mapping to the registry schema.

use serde::{Deserialize, Deserializer};
use sqlx::FromRow;

// =============================================================================
// Apk records (table `allapk`)
// =============================================================================

/// Package metadata record.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct ApkRow {
    pub id: i64,
    pub name: String,
    pub vers: Option<f64>,
    pub isdismiss: bool,
    pub description: String,
}

/// Fields for creating a package record.
///
/// The id is always assigned by the store; there is deliberately no id field
/// here, so a caller-supplied id in the request body is silently dropped.
#[derive(Debug, Clone, Deserialize)]
pub struct ApkDraft {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub vers: Option<f64>,
    #[serde(default = "default_isdismiss")]
    pub isdismiss: bool,
    #[serde(default)]
    pub description: String,
}

fn default_isdismiss() -> bool {
    true
}

impl Default for ApkDraft {
    fn default() -> Self {
        Self {
            name: String::new(),
            vers: None,
            isdismiss: true,
            description: String::new(),
        }
    }
}

/// Partial update for a package record.
///
/// Only fields present in the request are applied; absent fields keep their
/// prior values. `vers` is the one nullable column, so it is doubly optional:
/// the outer `None` means "not supplied", `Some(None)` means "clear the
/// version", `Some(Some(v))` means "set the version to v".
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApkPatch {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub vers: Option<Option<f64>>,
    pub isdismiss: Option<bool>,
    pub description: Option<String>,
}

impl ApkPatch {
    /// Whether the patch carries no fields at all.
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.vers.is_none()
            && self.isdismiss.is_none()
            && self.description.is_none()
    }

    /// Apply the supplied fields onto an existing row.
    pub fn apply(&self, row: &mut ApkRow) {
        if let Some(name) = &self.name {
            row.name = name.clone();
        }
        if let Some(vers) = self.vers {
            row.vers = vers;
        }
        if let Some(isdismiss) = self.isdismiss {
            row.isdismiss = isdismiss;
        }
        if let Some(description) = &self.description {
            row.description = description.clone();
        }
    }
}

// =============================================================================
// Bundle correlation records (table `bundlecorr`)
// =============================================================================

/// Bundle/project/platform correlation record.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct BundleCorrRow {
    pub id: i64,
    pub bundle: String,
    pub project: String,
    pub platform: String,
}

/// Fields for creating a correlation record.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BundleCorrDraft {
    #[serde(default)]
    pub bundle: String,
    #[serde(default)]
    pub project: String,
    #[serde(default)]
    pub platform: String,
}

/// Partial update for a correlation record.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BundleCorrPatch {
    pub bundle: Option<String>,
    pub project: Option<String>,
    pub platform: Option<String>,
}

impl BundleCorrPatch {
    /// Whether the patch carries no fields at all.
    pub fn is_empty(&self) -> bool {
        self.bundle.is_none() && self.project.is_none() && self.platform.is_none()
    }

    /// Apply the supplied fields onto an existing row.
    pub fn apply(&self, row: &mut BundleCorrRow) {
        if let Some(bundle) = &self.bundle {
            row.bundle = bundle.clone();
        }
        if let Some(project) = &self.project {
            row.project = project.clone();
        }
        if let Some(platform) = &self.platform {
            row.platform = platform.clone();
        }
    }
}

/// Deserialize a field so that an explicit `null` is distinguishable from the
/// field being absent: absence leaves the outer Option as `None` (via
/// `#[serde(default)]`), while any present value, including null, lands in
/// `Some(..)`.
fn double_option<'de, T, D>(de: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Deserialize::deserialize(de).map(Some)
}
