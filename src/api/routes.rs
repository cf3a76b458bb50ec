//! API route configuration.

use crate::api::handlers::{access_check_handler, create_link_handler, url_stats_handler};
use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};

/// Routes mounted under `/api`.
///
/// # Endpoints
///
/// - `POST /links`               - Create a short alias
/// - `GET  /stats/{url}`         - Total anonymous accesses for a code
/// - `GET  /stats/{url}/access`  - Per-user access presence check
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/links", post(create_link_handler))
        .route("/stats/{url}", get(url_stats_handler))
        .route("/stats/{url}/access", get(access_check_handler))
}
