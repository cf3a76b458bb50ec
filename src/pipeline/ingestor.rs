//! Consumer-group workers ingesting access events into the analytics store.

use crate::application::services::AnalyticsService;
use crate::domain::access_event::AccessEvent;
use crate::error::AppError;
use rdkafka::config::ClientConfig;
use rdkafka::consumer::{CommitMode, Consumer, StreamConsumer};
use rdkafka::error::KafkaError;
use rdkafka::message::{BorrowedMessage, Message};
use serde_json::json;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_retry::strategy::ExponentialBackoff;
use tokio_retry::Retry;
use tracing::{debug, error, info, warn};

/// What happens to the consumer offset when recording an event fails.
///
/// The store-side failure mode is the one place where the pipeline's
/// delivery guarantee is decided, so it is configuration rather than a
/// hard-coded choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Log the failure and advance anyway. The event is lost (at-most-once
    /// on handler failure).
    Advance,
    /// Retry with exponential backoff until the record succeeds or the
    /// worker is shut down; the offset only advances after success
    /// (at-least-once).
    Retry,
}

impl FromStr for FailurePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "advance" => Ok(Self::Advance),
            "retry" => Ok(Self::Retry),
            other => Err(format!(
                "unknown failure policy '{}' (expected 'advance' or 'retry')",
                other
            )),
        }
    }
}

impl std::fmt::Display for FailurePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Advance => write!(f, "advance"),
            Self::Retry => write!(f, "retry"),
        }
    }
}

/// Consumer-group wiring for the ingestor workers.
#[derive(Debug, Clone)]
pub struct IngestorSettings {
    pub brokers: String,
    pub topic: String,
    pub group_id: String,
    pub workers: usize,
    pub failure_policy: FailurePolicy,
}

/// Spawns one consumer-group member per worker.
///
/// All workers register under the same `group.id` with round-robin partition
/// assignment, so the broker hands each member a disjoint partition subset
/// and rebalances when members join or leave. Each worker processes its
/// claims sequentially, which preserves per-partition order.
///
/// # Errors
///
/// Returns [`KafkaError`] if a consumer cannot be constructed or subscribed.
pub fn spawn_workers(
    settings: &IngestorSettings,
    analytics: Arc<AnalyticsService>,
    shutdown: watch::Receiver<bool>,
) -> Result<Vec<JoinHandle<()>>, KafkaError> {
    let mut handles = Vec::with_capacity(settings.workers);

    for worker_id in 0..settings.workers {
        let consumer = build_consumer(settings, worker_id)?;
        consumer.subscribe(&[settings.topic.as_str()])?;

        handles.push(tokio::spawn(run_worker(
            worker_id,
            consumer,
            analytics.clone(),
            settings.failure_policy,
            shutdown.clone(),
        )));
    }

    Ok(handles)
}

/// Builds one group member.
///
/// Offsets are stored manually after each handled message
/// (`enable.auto.offset.store=false`) so the failure policy controls what
/// gets committed; the periodic auto-commit then persists stored offsets.
fn build_consumer(
    settings: &IngestorSettings,
    worker_id: usize,
) -> Result<StreamConsumer, KafkaError> {
    ClientConfig::new()
        .set("group.id", &settings.group_id)
        .set("bootstrap.servers", &settings.brokers)
        .set("client.id", format!("linktrack-ingestor-{}", worker_id))
        .set("partition.assignment.strategy", "roundrobin")
        .set("auto.offset.reset", "earliest")
        .set("enable.auto.commit", "true")
        .set("auto.commit.interval.ms", "5000")
        .set("enable.auto.offset.store", "false")
        .set("session.timeout.ms", "30000")
        .set("enable.partition.eof", "false")
        .create()
}

async fn run_worker(
    worker_id: usize,
    consumer: StreamConsumer,
    analytics: Arc<AnalyticsService>,
    policy: FailurePolicy,
    mut shutdown: watch::Receiver<bool>,
) {
    info!("Ingestor worker {} started", worker_id);

    loop {
        tokio::select! {
            _ = shutdown.changed() => break,
            result = consumer.recv() => match result {
                Ok(message) => {
                    let keep_going =
                        process_message(&consumer, &message, &analytics, policy, &mut shutdown)
                            .await;
                    if !keep_going {
                        break;
                    }
                }
                Err(e) => {
                    error!("Ingestor worker {} consumer error: {}", worker_id, e);
                    // Back off so a broken broker connection does not spin.
                    tokio::time::sleep(Duration::from_secs(1)).await;
                }
            },
        }
    }

    // Persist stored offsets before leaving the group; errors are logged,
    // never propagated - the worst case is redelivery.
    if let Err(e) = consumer.commit_consumer_state(CommitMode::Sync) {
        warn!("Ingestor worker {} offset commit failed: {}", worker_id, e);
    }

    info!("Ingestor worker {} stopped", worker_id);
}

/// Handles one delivered message. Returns `false` when shutdown interrupted
/// processing and the worker should exit without storing the offset.
async fn process_message(
    consumer: &StreamConsumer,
    message: &BorrowedMessage<'_>,
    analytics: &AnalyticsService,
    policy: FailurePolicy,
    shutdown: &mut watch::Receiver<bool>,
) -> bool {
    let event = match decode(message.payload().unwrap_or_default()) {
        Ok(event) => event,
        Err(e) => {
            // Malformed input never becomes valid; drop it under either policy.
            error!(
                "Malformed access event at {}[{}]@{}: {}",
                message.topic(),
                message.partition(),
                message.offset(),
                e
            );
            store_offset(consumer, message);
            return true;
        }
    };

    debug!(
        "Access event claimed (url: {}, user_id: {}, partition: {})",
        event.url,
        event.user_id,
        message.partition()
    );

    match policy {
        FailurePolicy::Advance => {
            match analytics.record(event.user_id, &event.url).await {
                Ok(()) => {
                    metrics::counter!("linktrack_events_ingested_total").increment(1);
                }
                Err(e) => {
                    metrics::counter!("linktrack_ingest_failures_total").increment(1);
                    error!(
                        "Failed to record access event for {}, advancing offset anyway: {}",
                        event.url, e
                    );
                }
            }
            store_offset(consumer, message);
            true
        }
        FailurePolicy::Retry => {
            let strategy =
                ExponentialBackoff::from_millis(10).max_delay(Duration::from_secs(5));

            tokio::select! {
                _ = shutdown.changed() => {
                    // Offset not stored: the event is redelivered on restart.
                    false
                }
                result = Retry::spawn(strategy, || analytics.record(event.user_id, &event.url)) => {
                    match result {
                        Ok(()) => {
                            metrics::counter!("linktrack_events_ingested_total").increment(1);
                            store_offset(consumer, message);
                            true
                        }
                        Err(e) => {
                            // Unreachable with an uncapped strategy, but the
                            // contract still holds: no success, no offset.
                            metrics::counter!("linktrack_ingest_failures_total").increment(1);
                            error!("Retries exhausted for access event {}: {}", event.url, e);
                            false
                        }
                    }
                }
            }
        }
    }
}

fn decode(payload: &[u8]) -> Result<AccessEvent, AppError> {
    serde_json::from_slice(payload).map_err(|e| {
        AppError::bad_request(
            "Malformed access event payload",
            json!({ "reason": e.to_string() }),
        )
    })
}

fn store_offset(consumer: &StreamConsumer, message: &BorrowedMessage<'_>) {
    if let Err(e) = consumer.store_offset_from_message(message) {
        warn!(
            "Failed to store offset for {}[{}]@{}: {}",
            message.topic(),
            message.partition(),
            message.offset(),
            e
        );
    }
}
