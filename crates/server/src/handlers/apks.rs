//! Package record endpoints.

use crate::auth::require_api_key;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use apkreg_metadata::models::{ApkDraft, ApkPatch, ApkRow};
use apkreg_metadata::repos::ApkRepo;
use axum::Json;
use axum::extract::{Path, Query, Request, State};
use axum::http::{HeaderMap, StatusCode};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Maximum request body size for record endpoints (1 MiB).
pub(crate) const MAX_BODY_SIZE: usize = 1024 * 1024;

/// Pagination query parameters shared by the list endpoints.
#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub skip: Option<i64>,
    pub limit: Option<i64>,
}

impl PageQuery {
    /// Resolve skip/limit against the configured defaults and hard cap.
    pub(crate) fn resolve(&self, state: &AppState) -> (i64, i64) {
        let skip = self.skip.unwrap_or(0).max(0);
        let limit = self
            .limit
            .unwrap_or(i64::from(state.config.server.default_page_limit))
            .clamp(0, i64::from(state.config.server.max_page_limit));
        (skip, limit)
    }
}

/// Package record as it appears on the wire.
#[derive(Debug, Serialize)]
pub struct ApkResponse {
    pub id: i64,
    pub name: String,
    pub vers: Option<f64>,
    pub isdismiss: bool,
    pub description: String,
}

impl From<ApkRow> for ApkResponse {
    fn from(row: ApkRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            vers: row.vers,
            isdismiss: row.isdismiss,
            description: row.description,
        }
    }
}

/// Response for listing package records.
///
/// `total` is the full table count, independent of the requested page.
#[derive(Debug, Serialize)]
pub struct ListApksResponse {
    pub apks: Vec<ApkResponse>,
    pub total: i64,
}

/// GET /v1/apks/{id} - Fetch one package record.
pub async fn get_apk(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<ApkResponse>> {
    let row = state
        .metadata
        .get_apk(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("apk {id}")))?;

    Ok(Json(row.into()))
}

/// GET /v1/apks - List package records with pagination.
pub async fn list_apks(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> ApiResult<Json<ListApksResponse>> {
    let (skip, limit) = query.resolve(&state);

    let rows = state.metadata.list_apks(skip, limit).await?;
    let total = state.metadata.count_apks().await?;

    Ok(Json(ListApksResponse {
        apks: rows.into_iter().map(Into::into).collect(),
        total,
    }))
}

/// GET /v1/apks/by-name/{name} - Fetch the first record matching a name.
///
/// Names are not unique; the lowest-id match wins so repeated lookups are
/// deterministic.
pub async fn get_apk_by_name(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ApiResult<Json<ApkResponse>> {
    let row = state
        .metadata
        .get_first_apk_by_name(&name)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("apk named '{name}'")))?;

    Ok(Json(row.into()))
}

/// GET /v1/apks/simple - Compact name-to-version projection.
///
/// Walks all records in id order; records with an empty name are skipped,
/// and when several records share a name the highest id wins.
pub async fn simple_apks(
    State(state): State<AppState>,
) -> ApiResult<Json<BTreeMap<String, Option<f64>>>> {
    let total = state.metadata.count_apks().await?;
    let rows = state.metadata.list_apks(0, total).await?;

    let mut simple = BTreeMap::new();
    for row in rows {
        if row.name.is_empty() {
            continue;
        }
        simple.insert(row.name, row.vers);
    }

    Ok(Json(simple))
}

/// POST /v1/apks - Create a package record.
///
/// Requires the API key. The id is always assigned by the store; any id in
/// the request body is ignored.
pub async fn create_apk(
    State(state): State<AppState>,
    req: Request,
) -> ApiResult<(StatusCode, Json<ApkResponse>)> {
    require_api_key(&state, req.headers())?;

    let bytes = axum::body::to_bytes(req.into_body(), MAX_BODY_SIZE)
        .await
        .map_err(|e| ApiError::BadRequest(format!("failed to read body: {e}")))?;
    let draft: ApkDraft = serde_json::from_slice(&bytes)
        .map_err(|e| ApiError::Validation(format!("invalid apk body: {e}")))?;

    let row = state.metadata.create_apk(&draft).await?;
    tracing::info!(id = row.id, name = %row.name, "Created apk record");

    Ok((StatusCode::CREATED, Json(row.into())))
}

/// PUT /v1/apks/{id} - Partially update a package record.
///
/// Requires the API key. Only fields present in the body are applied; an
/// explicit `"vers": null` clears the version while an absent `vers` leaves
/// it untouched.
pub async fn update_apk(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    req: Request,
) -> ApiResult<Json<ApkResponse>> {
    require_api_key(&state, req.headers())?;

    let bytes = axum::body::to_bytes(req.into_body(), MAX_BODY_SIZE)
        .await
        .map_err(|e| ApiError::BadRequest(format!("failed to read body: {e}")))?;
    let patch: ApkPatch = serde_json::from_slice(&bytes)
        .map_err(|e| ApiError::Validation(format!("invalid apk patch: {e}")))?;

    let row = state.metadata.update_apk(id, &patch).await?;
    tracing::info!(id = row.id, "Updated apk record");

    Ok(Json(row.into()))
}

/// DELETE /v1/apks/{id} - Delete a package record.
///
/// Requires the API key. Deleting an absent record is a 404.
pub async fn delete_apk(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> ApiResult<StatusCode> {
    require_api_key(&state, &headers)?;

    state.metadata.delete_apk(id).await?;
    tracing::info!(id, "Deleted apk record");

    Ok(StatusCode::OK)
}
