//! Handler for health check endpoint.

use axum::{extract::State, http::StatusCode, Json};

use crate::api::dto::health::{CheckStatus, HealthChecks, HealthResponse};
use crate::domain::repositories::AliasRepository;
use crate::infrastructure::cache::CacheService;
use crate::state::AppState;

/// Returns service health status with component checks.
///
/// # Endpoint
///
/// `GET /health`
///
/// # Response Codes
///
/// - **200 OK**: All components healthy
/// - **503 Service Unavailable**: One or more components degraded
///
/// # Components Checked
///
/// 1. **Storage**: Durable alias map connectivity
/// 2. **Cache**: Redis PING (NullCache always reports healthy)
/// 3. **Event queue**: Channel open, with remaining capacity
/// 4. **Analytics**: ClickHouse connectivity
pub async fn health_handler(
    State(state): State<AppState>,
) -> Result<Json<HealthResponse>, (StatusCode, Json<HealthResponse>)> {
    let storage_check = if state.aliases.health_check().await {
        CheckStatus::ok("Database connected")
    } else {
        CheckStatus::error("Database unreachable")
    };

    let cache_check = if state.cache.health_check().await {
        CheckStatus::ok("Cache connected")
    } else {
        CheckStatus::error("Cache connection failed")
    };

    let queue_check = if state.event_sender.is_closed() {
        CheckStatus::error("Event queue is closed")
    } else {
        CheckStatus::ok(format!("Capacity: {}", state.event_sender.capacity()))
    };

    let analytics_check = if state.analytics.health_check().await {
        CheckStatus::ok("Analytics store connected")
    } else {
        CheckStatus::error("Analytics store unreachable")
    };

    let all_healthy = storage_check.is_ok()
        && cache_check.is_ok()
        && queue_check.is_ok()
        && analytics_check.is_ok();

    let response = HealthResponse {
        status: if all_healthy { "healthy" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        checks: HealthChecks {
            storage: storage_check,
            cache: cache_check,
            event_queue: queue_check,
            analytics: analytics_check,
        },
    };

    if all_healthy {
        Ok(Json(response))
    } else {
        Err((StatusCode::SERVICE_UNAVAILABLE, Json(response)))
    }
}
