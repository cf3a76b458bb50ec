//! DTOs for alias creation.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Request to create a short alias.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateLinkRequest {
    /// The original URL to alias (must be valid HTTP/HTTPS).
    #[validate(url(message = "Invalid URL format"))]
    pub url: String,

    /// The creating user. Defaults to 0 (anonymous) when omitted.
    #[serde(default)]
    pub user_id: i64,
}

/// Response carrying the generated short code.
#[derive(Debug, Serialize)]
pub struct CreateLinkResponse {
    pub code: String,
}
