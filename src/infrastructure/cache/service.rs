//! Cache service trait and error types.

use async_trait::async_trait;

/// Errors that can occur during cache operations.
///
/// Cache failures never fail a request: the resolver falls through to the
/// durable map and create treats a failed write as non-fatal.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("Cache connection error: {0}")]
    ConnectionError(String),
    #[error("Cache operation error: {0}")]
    OperationError(String),
}

/// Result type for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;

/// Trait for caching alias mappings.
///
/// Implementations must be thread-safe and handle errors gracefully without
/// disrupting the application (cache failures degrade to durable-map lookups).
///
/// # Implementations
///
/// - [`crate::infrastructure::cache::RedisCache`] - Redis-backed cache with TTL support
/// - [`crate::infrastructure::cache::NullCache`] - No-op implementation for disabled caching
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CacheService: Send + Sync {
    /// Retrieves the original URL for a short code from cache.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(url))` on cache hit
    /// - `Ok(None)` on cache miss or error (fail-open behavior)
    async fn get(&self, code: &str) -> CacheResult<Option<String>>;

    /// Stores an alias mapping in cache with optional TTL.
    ///
    /// # Arguments
    ///
    /// - `code` - The short code key
    /// - `original_url` - The full URL to cache
    /// - `ttl_seconds` - Optional TTL in seconds (implementation-specific default if None)
    async fn set(
        &self,
        code: &str,
        original_url: &str,
        ttl_seconds: Option<u64>,
    ) -> CacheResult<()>;

    /// Checks if the cache backend is healthy.
    ///
    /// Used by the health check endpoint to report cache status.
    async fn health_check(&self) -> bool;
}
