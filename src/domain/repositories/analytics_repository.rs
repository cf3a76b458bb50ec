//! Repository trait for the analytics store.

use crate::error::AppError;
use async_trait::async_trait;

/// Append-only raw access log plus incrementally merged per-(url, user) counters.
///
/// Counting is delivery-count based, not event-identity based: recording the
/// same access twice increments the counter twice. Under the pipeline's
/// at-least-once delivery this can inflate totals; that is an accepted
/// approximation, so implementations must not deduplicate.
///
/// Counters are commutative partial sums: ingestion order never affects the
/// merged result, which is what makes concurrent ingestor workers safe
/// without locking.
///
/// # Implementations
///
/// - [`crate::infrastructure::analytics::ClickHouseStore`] - raw table + AggregatingMergeTree
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AnalyticsRepository: Send + Sync {
    /// Appends one raw access event for `(url, user_id)`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Storage`] if the append fails. The caller decides
    /// whether a failure blocks offset advancement (see the ingestor's
    /// failure policy).
    async fn record_access(&self, user_id: i64, url: &str) -> Result<(), AppError>;

    /// Total anonymous (user 0) accesses for `url`.
    ///
    /// Returns 0 when no aggregate exists yet - absence is not an error.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Storage`] on query failure.
    async fn url_stats(&self, url: &str) -> Result<i64, AppError>;

    /// Whether at least one access for exactly `(url, user_id)` was recorded.
    ///
    /// Monotonic: once true, never reverts to false.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Storage`] on query failure.
    async fn has_accessed(&self, url: &str, user_id: i64) -> Result<bool, AppError>;

    /// Checks whether the analytics store is reachable.
    ///
    /// Used by the health endpoint.
    async fn health_check(&self) -> bool;
}
