//! Handler for short code redirect.

use axum::{
    extract::{Path, State},
    response::Redirect,
};

use crate::error::AppError;
use crate::state::AppState;

/// Resolves a short code and redirects to its original URL.
///
/// # Endpoint
///
/// `GET /{code}`
///
/// # Request Flow
///
/// 1. Emit the anonymous access event (always, before resolution)
/// 2. Check the cache for the mapping
/// 3. On cache miss or error, query the durable map
/// 4. Return 307 Temporary Redirect
///
/// Resolution is anonymous: the emitted event always carries `user_id = 0`
/// regardless of who is resolving.
///
/// # Errors
///
/// Returns 404 Not Found if the short code doesn't exist. The access event
/// is emitted even in that case.
pub async fn redirect_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
) -> Result<Redirect, AppError> {
    let original_url = state.shortener.resolve_alias(&code).await?;

    Ok(Redirect::temporary(&original_url))
}
