//! Handler for alias creation.

use axum::{extract::State, http::StatusCode, Json};
use validator::Validate;

use crate::api::dto::links::{CreateLinkRequest, CreateLinkResponse};
use crate::error::AppError;
use crate::state::AppState;

/// Creates a short alias for a URL.
///
/// # Endpoint
///
/// `POST /api/links`
///
/// # Request Body
///
/// ```json
/// {
///   "url": "https://example.com",
///   "user_id": 42
/// }
/// ```
///
/// # Response
///
/// `201 Created` with the generated 5-character code:
///
/// ```json
/// { "code": "aB3xZ" }
/// ```
///
/// # Side Effects
///
/// On success an access event carrying `user_id` is emitted to the analytics
/// pipeline. Validation failures reject the request before any side effect.
///
/// # Errors
///
/// Returns 400 Bad Request if `url` is missing or malformed.
/// Returns 500 if the durable write fails (no event is emitted in that case).
pub async fn create_link_handler(
    State(state): State<AppState>,
    Json(payload): Json<CreateLinkRequest>,
) -> Result<(StatusCode, Json<CreateLinkResponse>), AppError> {
    payload.validate()?;

    let code = state
        .shortener
        .create_alias(&payload.url, payload.user_id)
        .await?;

    Ok((StatusCode::CREATED, Json(CreateLinkResponse { code })))
}
