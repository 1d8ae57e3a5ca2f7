//! Health check and static index endpoints.

use crate::auth::require_api_key_param;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use apkreg_metadata::MetadataStore;
use axum::Json;
use axum::extract::{Query, State};
use axum::response::Html;
use serde::{Deserialize, Serialize};

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

/// GET /v1/health - Health check.
///
/// This endpoint is intentionally unauthenticated to support:
/// - Kubernetes liveness/readiness probes
/// - Load balancer health checks
///
/// Returns only non-sensitive information (status and version).
pub async fn health_check(State(state): State<AppState>) -> ApiResult<Json<HealthResponse>> {
    // Check metadata store connectivity
    state.metadata.health_check().await?;

    Ok(Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    }))
}

/// Query parameters for the index page.
#[derive(Debug, Deserialize)]
pub struct IndexQuery {
    pub key: Option<String>,
}

/// GET / - Serve the static index page.
///
/// The key travels as a query parameter here because the page is meant to be
/// opened in a browser, where custom headers are not available.
pub async fn serve_index(
    State(state): State<AppState>,
    Query(query): Query<IndexQuery>,
) -> ApiResult<Html<String>> {
    require_api_key_param(&state, query.key.as_deref())?;

    let path = &state.config.server.index_path;
    let html = tokio::fs::read_to_string(path).await.map_err(|e| {
        ApiError::Internal(format!("failed to read index page {}: {e}", path.display()))
    })?;

    Ok(Html(html))
}
