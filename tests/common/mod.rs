#![allow(dead_code)]

//! Shared test fixtures: in-memory implementations of the repository traits
//! and a state builder, so handler tests run without Postgres, Redis, Kafka,
//! or ClickHouse.

use async_trait::async_trait;
use chrono::Utc;
use linktrack::application::services::{AnalyticsService, ShortenerService};
use linktrack::domain::access_event::AccessEvent;
use linktrack::domain::entities::{Alias, NewAlias};
use linktrack::domain::repositories::{AliasRepository, AnalyticsRepository};
use linktrack::error::AppError;
use linktrack::infrastructure::cache::{CacheService, NullCache};
use linktrack::pipeline::{self, AccessEventReceiver};
use linktrack::state::AppState;
use serde_json::json;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// In-memory durable alias map.
///
/// Enforces code uniqueness the way the Postgres primary key does: a save
/// with a taken code fails with a validation error.
pub struct InMemoryAliasRepository {
    aliases: Mutex<HashMap<String, Alias>>,
    healthy: AtomicBool,
}

impl InMemoryAliasRepository {
    pub fn new() -> Self {
        Self {
            aliases: Mutex::new(HashMap::new()),
            healthy: AtomicBool::new(true),
        }
    }

    pub fn set_healthy(&self, healthy: bool) {
        self.healthy.store(healthy, Ordering::SeqCst);
    }

    pub fn insert(&self, code: &str, original_url: &str) {
        self.aliases.lock().unwrap().insert(
            code.to_string(),
            Alias::new(code.to_string(), original_url.to_string(), Utc::now()),
        );
    }

    pub fn len(&self) -> usize {
        self.aliases.lock().unwrap().len()
    }
}

#[async_trait]
impl AliasRepository for InMemoryAliasRepository {
    async fn save(&self, new_alias: NewAlias) -> Result<Alias, AppError> {
        let mut aliases = self.aliases.lock().unwrap();

        if aliases.contains_key(&new_alias.code) {
            return Err(AppError::bad_request(
                "Alias code already exists",
                json!({ "code": new_alias.code }),
            ));
        }

        let alias = Alias::new(new_alias.code.clone(), new_alias.original_url, Utc::now());
        aliases.insert(new_alias.code, alias.clone());
        Ok(alias)
    }

    async fn get(&self, code: &str) -> Result<Option<Alias>, AppError> {
        Ok(self.aliases.lock().unwrap().get(code).cloned())
    }

    async fn health_check(&self) -> bool {
        self.healthy.load(Ordering::SeqCst)
    }
}

/// In-memory analytics store with the same contract as the ClickHouse one:
/// an append-only raw log plus commutative per-(url, user) counters, and no
/// deduplication of redelivered events.
pub struct InMemoryAnalyticsStore {
    raw_log: Mutex<Vec<String>>,
    counters: Mutex<HashMap<(String, i64), i64>>,
    healthy: AtomicBool,
}

impl InMemoryAnalyticsStore {
    pub fn new() -> Self {
        Self {
            raw_log: Mutex::new(Vec::new()),
            counters: Mutex::new(HashMap::new()),
            healthy: AtomicBool::new(true),
        }
    }

    pub fn set_healthy(&self, healthy: bool) {
        self.healthy.store(healthy, Ordering::SeqCst);
    }

    pub fn raw_event_count(&self) -> usize {
        self.raw_log.lock().unwrap().len()
    }
}

#[async_trait]
impl AnalyticsRepository for InMemoryAnalyticsStore {
    async fn record_access(&self, user_id: i64, url: &str) -> Result<(), AppError> {
        self.raw_log
            .lock()
            .unwrap()
            .push(format!(r#"{{"url":"{}","user_id":{}}}"#, url, user_id));

        *self
            .counters
            .lock()
            .unwrap()
            .entry((url.to_string(), user_id))
            .or_insert(0) += 1;

        Ok(())
    }

    async fn url_stats(&self, url: &str) -> Result<i64, AppError> {
        Ok(self
            .counters
            .lock()
            .unwrap()
            .get(&(url.to_string(), 0))
            .copied()
            .unwrap_or(0))
    }

    async fn has_accessed(&self, url: &str, user_id: i64) -> Result<bool, AppError> {
        Ok(self
            .counters
            .lock()
            .unwrap()
            .get(&(url.to_string(), user_id))
            .copied()
            .unwrap_or(0)
            > 0)
    }

    async fn health_check(&self) -> bool {
        self.healthy.load(Ordering::SeqCst)
    }
}

/// Everything a handler test needs: the wired state plus handles on the
/// fakes and the event receiver.
pub struct TestContext {
    pub state: AppState,
    pub events: AccessEventReceiver,
    pub aliases: Arc<InMemoryAliasRepository>,
    pub analytics: Arc<AnalyticsService>,
    pub store: Arc<InMemoryAnalyticsStore>,
}

pub fn create_test_state() -> TestContext {
    let aliases = Arc::new(InMemoryAliasRepository::new());
    let store = Arc::new(InMemoryAnalyticsStore::new());
    let cache: Arc<dyn CacheService> = Arc::new(NullCache::new());

    let (tx, rx) = pipeline::channel(100);

    let shortener = Arc::new(ShortenerService::new(
        aliases.clone(),
        cache.clone(),
        tx.clone(),
        3600,
    ));
    let analytics = Arc::new(AnalyticsService::new(store.clone()));

    let state = AppState::new(
        shortener,
        analytics.clone(),
        aliases.clone(),
        cache,
        tx,
    );

    TestContext {
        state,
        events: rx,
        aliases,
        analytics,
        store,
    }
}

/// Simulates the broker leg of the pipeline: drains the channel, round-trips
/// each event through its wire encoding, and records it. Returns how many
/// events were delivered.
pub async fn deliver_pending_events(ctx: &mut TestContext) -> usize {
    let mut delivered = 0;

    while let Some(event) = ctx.events.try_recv() {
        let payload = serde_json::to_vec(&event).unwrap();
        let decoded: AccessEvent = serde_json::from_slice(&payload).unwrap();
        ctx.analytics
            .record(decoded.user_id, &decoded.url)
            .await
            .unwrap();
        delivered += 1;
    }

    delivered
}
