//! Access recording and statistics service.

use std::sync::Arc;

use crate::domain::repositories::AnalyticsRepository;
use crate::error::AppError;
use tracing::error;

/// Service over the analytics store.
///
/// The write path ([`Self::record`]) is called by the ingestor workers; the
/// read paths serve the stats endpoints. Reads observe eventually-consistent
/// totals: events still in flight through the pipeline are not counted yet.
pub struct AnalyticsService {
    store: Arc<dyn AnalyticsRepository>,
}

impl AnalyticsService {
    /// Creates a new analytics service.
    pub fn new(store: Arc<dyn AnalyticsRepository>) -> Self {
        Self { store }
    }

    /// Appends one raw access event.
    ///
    /// Not deduplicated: redelivery of the same event counts again. The
    /// pipeline's at-least-once delivery therefore may inflate totals; that
    /// is the documented tradeoff for a commutative, lock-free aggregate.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Storage`] if the append fails.
    pub async fn record(&self, user_id: i64, url: &str) -> Result<(), AppError> {
        self.store.record_access(user_id, url).await.map_err(|e| {
            error!("Failed to save access stats for {}: {}", url, e);
            e
        })
    }

    /// Total anonymous accesses (resolves) for `url`; 0 when unseen.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Storage`] on query failure.
    pub async fn url_stats(&self, url: &str) -> Result<i64, AppError> {
        self.store.url_stats(url).await.map_err(|e| {
            error!("Failed to get total stats for {}: {}", url, e);
            e
        })
    }

    /// Whether `(url, user_id)` has at least one recorded access.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Storage`] on query failure.
    pub async fn has_accessed(&self, url: &str, user_id: i64) -> Result<bool, AppError> {
        self.store.has_accessed(url, user_id).await.map_err(|e| {
            error!("Failed to check access for {}: {}", url, e);
            e
        })
    }

    /// Whether the analytics store answers queries.
    pub async fn health_check(&self) -> bool {
        self.store.health_check().await
    }
}
