//! Business logic services.
//!
//! - [`ShortenerService`] - alias creation and resolution (cache-aside, event emission)
//! - [`AnalyticsService`] - access recording and stats reads over the analytics store

pub mod analytics_service;
pub mod shortener_service;

pub use analytics_service::AnalyticsService;
pub use shortener_service::ShortenerService;
