//! Handlers for the analytics read path.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde_json::json;

use crate::api::dto::stats::{AccessCheckParams, AccessCheckResponse, UrlStatsResponse};
use crate::error::AppError;
use crate::state::AppState;

/// Returns total anonymous accesses for a short code.
///
/// # Endpoint
///
/// `GET /api/stats/{url}`
///
/// Counts only resolve-time (user 0) events, and reads the merged partial
/// aggregates rather than the raw log. An unseen url yields 0, not 404.
/// Totals are eventually consistent: events still in flight are not
/// counted yet.
pub async fn url_stats_handler(
    Path(url): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<UrlStatsResponse>, AppError> {
    let total_accesses = state.analytics.url_stats(&url).await?;

    Ok(Json(UrlStatsResponse {
        url,
        total_accesses,
    }))
}

/// Returns whether a user has ever accessed a short code.
///
/// # Endpoint
///
/// `GET /api/stats/{url}/access?user_id=N`
///
/// A presence check, not a write: true once at least one event for exactly
/// `(url, user_id)` has been ingested, and monotonic from then on.
///
/// # Errors
///
/// Returns 400 Bad Request if `user_id` is missing.
pub async fn access_check_handler(
    Path(url): Path<String>,
    Query(params): Query<AccessCheckParams>,
    State(state): State<AppState>,
) -> Result<Json<AccessCheckResponse>, AppError> {
    let user_id = params.user_id.ok_or_else(|| {
        AppError::bad_request("user_id query parameter is required", json!({ "url": url }))
    })?;

    let accessed = state.analytics.has_accessed(&url, user_id).await?;

    Ok(Json(AccessCheckResponse {
        url,
        user_id,
        accessed,
    }))
}
