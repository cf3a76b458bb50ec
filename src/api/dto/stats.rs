//! DTOs for the analytics read path.

use serde::{Deserialize, Serialize};

/// Total anonymous accesses for one short code.
#[derive(Debug, Serialize)]
pub struct UrlStatsResponse {
    pub url: String,
    pub total_accesses: i64,
}

/// Query parameters for the access presence check.
///
/// `user_id` is required; it is optional here only so the handler can return
/// a structured 400 instead of axum's default rejection.
#[derive(Debug, Deserialize)]
pub struct AccessCheckParams {
    pub user_id: Option<i64>,
}

/// Whether `(url, user_id)` has at least one recorded access.
#[derive(Debug, Serialize)]
pub struct AccessCheckResponse {
    pub url: String,
    pub user_id: i64,
    pub accessed: bool,
}
