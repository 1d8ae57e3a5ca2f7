//! API key checks for mutating endpoints and the index page.
//!
//! A single process-wide key gates all writes. Handlers call these checks
//! before touching the store, so an unauthorized request never reaches the
//! database.

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use axum::http::HeaderMap;

/// Header carrying the API key on mutating routes.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Require a valid `x-api-key` header.
///
/// Exact string comparison against the configured key. Missing or
/// non-matching keys are rejected with 401 before any store access.
pub fn require_api_key(state: &AppState, headers: &HeaderMap) -> ApiResult<()> {
    let presented = headers
        .get(API_KEY_HEADER)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| ApiError::Unauthorized("missing x-api-key header".to_string()))?;

    if presented != state.config.api.key {
        return Err(ApiError::Unauthorized("invalid API key".to_string()));
    }

    Ok(())
}

/// Require a valid `key` query parameter (index page only).
pub fn require_api_key_param(state: &AppState, key: Option<&str>) -> ApiResult<()> {
    let presented =
        key.ok_or_else(|| ApiError::Unauthorized("missing key query parameter".to_string()))?;

    if presented != state.config.api.key {
        return Err(ApiError::Unauthorized("invalid API key".to_string()));
    }

    Ok(())
}
