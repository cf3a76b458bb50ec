//! Background task publishing access events to the broker topic.

use crate::domain::access_event::AccessEvent;
use crate::pipeline::channel::AccessEventReceiver;
use rdkafka::config::ClientConfig;
use rdkafka::error::KafkaError;
use rdkafka::producer::{FutureProducer, FutureRecord, Producer};
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Publishes channel events to the access-event topic.
///
/// One emitter task runs per process and owns the producer handle
/// exclusively. Delivery is best-effort: broker errors are logged, never
/// retried, and never surfaced to the request that produced the event.
///
/// Records are sent keyless, so the broker-side partitioner spreads them
/// across partitions. Ordering for a single (url, user) key is therefore
/// not preserved end-to-end; the analytics store counts commutatively and
/// does not depend on sequence.
pub struct Emitter {
    producer: FutureProducer,
    topic: String,
    flush_timeout: Duration,
}

impl Emitter {
    /// Creates the producer handle.
    ///
    /// Writes are acknowledged by the partition leader only (`acks=1`) and
    /// batched for up to 500 ms (`linger.ms`) to amortize round trips. A
    /// leader failure between ack and replication can lose an event; that is
    /// an accepted durability tradeoff.
    ///
    /// # Errors
    ///
    /// Returns [`KafkaError`] if the client cannot be constructed.
    pub fn new(
        brokers: &str,
        topic: impl Into<String>,
        flush_timeout: Duration,
    ) -> Result<Self, KafkaError> {
        let producer: FutureProducer = ClientConfig::new()
            .set("bootstrap.servers", brokers)
            .set("client.id", "linktrack-emitter")
            .set("acks", "1")
            .set("compression.type", "snappy")
            .set("linger.ms", "500")
            .set("message.timeout.ms", "30000")
            .create()?;

        Ok(Self {
            producer,
            topic: topic.into(),
            flush_timeout,
        })
    }

    /// Drains the channel until every sender is dropped, then flushes.
    ///
    /// Serialization failures drop the event (malformed input is not
    /// retryable). Enqueue and delivery failures are logged only; delivery
    /// outcomes are observed on a detached task so a slow broker never
    /// stalls the drain loop.
    pub async fn run(self, mut events: AccessEventReceiver) {
        info!("Event emitter started (topic: {})", self.topic);

        while let Some(event) = events.recv().await {
            self.publish(&event);
        }

        // Channel closed: all senders gone and the buffer is drained.
        // Flush whatever librdkafka still holds in its batches.
        if let Err(e) = self.producer.flush(self.flush_timeout) {
            warn!("Failed to flush outstanding event batches: {}", e);
        }

        info!("Event emitter stopped");
    }

    fn publish(&self, event: &AccessEvent) {
        let payload = match serde_json::to_vec(event) {
            Ok(payload) => payload,
            Err(e) => {
                metrics::counter!("linktrack_events_dropped_total").increment(1);
                error!("Failed to serialize access event, dropping: {}", e);
                return;
            }
        };

        let record = FutureRecord::<(), _>::to(&self.topic).payload(&payload);

        match self.producer.send_result(record) {
            Ok(delivery) => {
                let url = event.url.clone();
                tokio::spawn(async move {
                    match delivery.await {
                        Ok(Ok((partition, offset))) => {
                            metrics::counter!("linktrack_events_produced_total").increment(1);
                            debug!(
                                "Access event delivered (url: {}, partition: {}, offset: {})",
                                url, partition, offset
                            );
                        }
                        Ok(Err((e, _message))) => {
                            metrics::counter!("linktrack_events_dropped_total").increment(1);
                            warn!("Broker rejected access event for {}: {}", url, e);
                        }
                        Err(_canceled) => {
                            warn!("Delivery result dropped before completion for {}", url);
                        }
                    }
                });
            }
            Err((e, _record)) => {
                metrics::counter!("linktrack_events_dropped_total").increment(1);
                warn!("Failed to enqueue access event: {}", e);
            }
        }
    }
}
