//! Alias entity representing a short code to URL mapping.

use chrono::{DateTime, Utc};

/// A short alias mapped to an original URL.
///
/// Immutable once created. The durable map is the source of truth; the cache
/// holds a derived copy that may be evicted or expire independently.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alias {
    pub code: String,
    pub original_url: String,
    pub created_at: DateTime<Utc>,
}

impl Alias {
    /// Creates a new Alias instance.
    pub fn new(code: String, original_url: String, created_at: DateTime<Utc>) -> Self {
        Self {
            code,
            original_url,
            created_at,
        }
    }
}

/// Input data for creating a new alias.
#[derive(Debug, Clone)]
pub struct NewAlias {
    pub code: String,
    pub original_url: String,
}
