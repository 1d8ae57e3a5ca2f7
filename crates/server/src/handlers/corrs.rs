//! Bundle correlation endpoints.

use crate::auth::require_api_key;
use crate::error::{ApiError, ApiResult};
use crate::handlers::apks::{MAX_BODY_SIZE, PageQuery};
use crate::state::AppState;
use apkreg_metadata::models::{BundleCorrDraft, BundleCorrPatch, BundleCorrRow};
use apkreg_metadata::repos::BundleCorrRepo;
use axum::Json;
use axum::extract::{Path, Query, Request, State};
use axum::http::{HeaderMap, StatusCode};
use serde::Serialize;

/// Correlation record as it appears on the wire.
#[derive(Debug, Serialize)]
pub struct BundleCorrResponse {
    pub id: i64,
    pub bundle: String,
    pub project: String,
    pub platform: String,
}

impl From<BundleCorrRow> for BundleCorrResponse {
    fn from(row: BundleCorrRow) -> Self {
        Self {
            id: row.id,
            bundle: row.bundle,
            project: row.project,
            platform: row.platform,
        }
    }
}

/// Response for listing correlation records.
#[derive(Debug, Serialize)]
pub struct ListCorrsResponse {
    pub correlations: Vec<BundleCorrResponse>,
    pub total: i64,
}

/// GET /v1/correlations/{id} - Fetch one correlation record.
pub async fn get_corr(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<BundleCorrResponse>> {
    let row = state
        .metadata
        .get_corr(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("correlation {id}")))?;

    Ok(Json(row.into()))
}

/// GET /v1/correlations - List correlation records with pagination.
pub async fn list_corrs(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> ApiResult<Json<ListCorrsResponse>> {
    let (skip, limit) = query.resolve(&state);

    let rows = state.metadata.list_corrs(skip, limit).await?;
    let total = state.metadata.count_corrs().await?;

    Ok(Json(ListCorrsResponse {
        correlations: rows.into_iter().map(Into::into).collect(),
        total,
    }))
}

/// GET /v1/correlations/by-bundle/{bundle} - First record matching a bundle id.
pub async fn get_corr_by_bundle(
    State(state): State<AppState>,
    Path(bundle): Path<String>,
) -> ApiResult<Json<BundleCorrResponse>> {
    let row = state
        .metadata
        .get_first_corr_by_bundle(&bundle)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("correlation for bundle '{bundle}'")))?;

    Ok(Json(row.into()))
}

/// POST /v1/correlations - Create a correlation record.
///
/// Requires the API key.
pub async fn create_corr(
    State(state): State<AppState>,
    req: Request,
) -> ApiResult<(StatusCode, Json<BundleCorrResponse>)> {
    require_api_key(&state, req.headers())?;

    let bytes = axum::body::to_bytes(req.into_body(), MAX_BODY_SIZE)
        .await
        .map_err(|e| ApiError::BadRequest(format!("failed to read body: {e}")))?;
    let draft: BundleCorrDraft = serde_json::from_slice(&bytes)
        .map_err(|e| ApiError::Validation(format!("invalid correlation body: {e}")))?;

    let row = state.metadata.create_corr(&draft).await?;
    tracing::info!(id = row.id, bundle = %row.bundle, "Created correlation record");

    Ok((StatusCode::CREATED, Json(row.into())))
}

/// PUT /v1/correlations/{id} - Partially update a correlation record.
///
/// Requires the API key. Only fields present in the body are applied.
pub async fn update_corr(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    req: Request,
) -> ApiResult<Json<BundleCorrResponse>> {
    require_api_key(&state, req.headers())?;

    let bytes = axum::body::to_bytes(req.into_body(), MAX_BODY_SIZE)
        .await
        .map_err(|e| ApiError::BadRequest(format!("failed to read body: {e}")))?;
    let patch: BundleCorrPatch = serde_json::from_slice(&bytes)
        .map_err(|e| ApiError::Validation(format!("invalid correlation patch: {e}")))?;

    let row = state.metadata.update_corr(id, &patch).await?;
    tracing::info!(id = row.id, "Updated correlation record");

    Ok(Json(row.into()))
}

/// DELETE /v1/correlations/{id} - Delete a correlation record.
///
/// Requires the API key. Deleting an absent record is a 404.
pub async fn delete_corr(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> ApiResult<StatusCode> {
    require_api_key(&state, &headers)?;

    state.metadata.delete_corr(id).await?;
    tracing::info!(id, "Deleted correlation record");

    Ok(StatusCode::OK)
}
