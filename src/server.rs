//! Server initialization and runtime setup.
//!
//! Wires the stores, the event pipeline, and the Axum server, and drives the
//! ordered graceful shutdown.

use crate::application::services::{AnalyticsService, ShortenerService};
use crate::config::Config;
use crate::domain::repositories::{AliasRepository, AnalyticsRepository};
use crate::infrastructure::analytics::ClickHouseStore;
use crate::infrastructure::cache::{CacheService, NullCache, RedisCache};
use crate::infrastructure::persistence::PgAliasRepository;
use crate::pipeline::{self, Emitter, IngestorSettings};
use crate::routes::app_router;
use crate::state::AppState;

use anyhow::{Context, Result};
use axum::extract::Request;
use axum::ServiceExt;
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Runs the service with the given configuration.
///
/// Initializes:
/// - PostgreSQL connection pool (and applies migrations)
/// - Redis cache (or NullCache fallback)
/// - ClickHouse analytics schema
/// - Event channel, emitter task, and ingestor workers
/// - Axum HTTP server with graceful shutdown
///
/// Every connection failure is returned to the caller, which decides whether
/// to retry or abort startup.
///
/// # Errors
///
/// Returns an error if any store connection, the broker client, the server
/// bind, or the server runtime fails.
pub async fn run(config: Config) -> Result<()> {
    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(Duration::from_secs(config.db_connect_timeout))
        .idle_timeout(Duration::from_secs(config.db_idle_timeout))
        .max_lifetime(Duration::from_secs(config.db_max_lifetime))
        .connect(&config.database_url)
        .await
        .context("Failed to connect to database")?;
    tracing::info!("Connected to database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run migrations")?;

    let cache: Arc<dyn CacheService> = if let Some(redis_url) = &config.redis_url {
        match RedisCache::connect(redis_url, config.cache_ttl_seconds).await {
            Ok(redis) => {
                tracing::info!("Cache enabled (Redis)");
                Arc::new(redis)
            }
            Err(e) => {
                tracing::warn!("Failed to connect to Redis: {}. Using NullCache.", e);
                Arc::new(NullCache::new())
            }
        }
    } else {
        tracing::info!("Cache disabled (NullCache)");
        Arc::new(NullCache::new())
    };

    let store = ClickHouseStore::new(
        &config.clickhouse_url,
        &config.clickhouse_database,
        &config.clickhouse_user,
        &config.clickhouse_password,
    );
    store
        .init_schema()
        .await
        .context("Failed to initialize analytics schema")?;
    let analytics_store: Arc<dyn AnalyticsRepository> = Arc::new(store);
    let analytics = Arc::new(AnalyticsService::new(analytics_store));

    let (event_sender, event_receiver) = pipeline::channel(config.event_queue_capacity);

    let grace = Duration::from_secs(config.shutdown_grace_seconds);

    let emitter = Emitter::new(&config.kafka_brokers, &config.kafka_topic, grace)
        .context("Failed to create broker producer")?;
    let emitter_task = tokio::spawn(emitter.run(event_receiver));
    tracing::info!("Event emitter started");

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let ingestor_settings = IngestorSettings {
        brokers: config.kafka_brokers.clone(),
        topic: config.kafka_topic.clone(),
        group_id: config.kafka_group_id.clone(),
        workers: config.ingestor_workers,
        failure_policy: config.ingest_failure_policy,
    };
    let ingestor_tasks =
        pipeline::spawn_workers(&ingestor_settings, analytics.clone(), shutdown_rx)
            .context("Failed to start ingestor workers")?;
    tracing::info!("Started {} ingestor workers", ingestor_tasks.len());

    let aliases: Arc<dyn AliasRepository> = Arc::new(PgAliasRepository::new(Arc::new(pool)));

    let shortener = Arc::new(ShortenerService::new(
        aliases.clone(),
        cache.clone(),
        event_sender.clone(),
        config.cache_ttl_seconds,
    ));

    let state = AppState::new(shortener, analytics, aliases, cache, event_sender);

    let app = app_router(state);

    let addr: SocketAddr = config.listen_addr.parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{addr}");

    axum::serve(listener, ServiceExt::<Request>::into_make_service(app))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // The server (and with it the state) is gone, so every event sender is
    // dropped: the emitter drains the channel, flushes, and exits. The
    // ingestors are told to commit and leave the group.
    let _ = shutdown_tx.send(true);

    await_with_grace(emitter_task, "emitter", grace).await;
    for (i, task) in ingestor_tasks.into_iter().enumerate() {
        await_with_grace(task, &format!("ingestor worker {i}"), grace).await;
    }

    tracing::info!("Shutdown complete");
    Ok(())
}

/// Waits for a pipeline task, abandoning it after the grace period so a
/// stalled broker connection cannot hang shutdown indefinitely.
async fn await_with_grace(task: JoinHandle<()>, name: &str, grace: Duration) {
    match tokio::time::timeout(grace, task).await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => tracing::error!("{} task panicked: {}", name, e),
        Err(_) => tracing::warn!("{} did not stop within {:?}, abandoning", name, grace),
    }
}

/// Resolves when SIGINT or SIGTERM is received.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, stopping inbound requests");
}
