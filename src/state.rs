use std::sync::Arc;

use crate::application::services::{AnalyticsService, ShortenerService};
use crate::domain::repositories::AliasRepository;
use crate::infrastructure::cache::CacheService;
use crate::pipeline::AccessEventSender;

/// Shared application state injected into every handler.
///
/// Repositories and the cache are held as trait objects so tests can wire in
/// fakes without touching Postgres, Redis, or ClickHouse.
#[derive(Clone)]
pub struct AppState {
    pub shortener: Arc<ShortenerService>,
    pub analytics: Arc<AnalyticsService>,
    pub aliases: Arc<dyn AliasRepository>,
    pub cache: Arc<dyn CacheService>,
    pub event_sender: AccessEventSender,
}

impl AppState {
    /// Creates the shared state.
    pub fn new(
        shortener: Arc<ShortenerService>,
        analytics: Arc<AnalyticsService>,
        aliases: Arc<dyn AliasRepository>,
        cache: Arc<dyn CacheService>,
        event_sender: AccessEventSender,
    ) -> Self {
        Self {
            shortener,
            analytics,
            aliases,
            cache,
            event_sender,
        }
    }
}
