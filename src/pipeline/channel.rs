//! Bounded in-process hand-off between the resolver and the emitter.
//!
//! A fixed-capacity multi-producer/single-consumer queue constructed by
//! [`channel`] and owned by the wiring code in `server.rs` - there is no
//! package-level shared channel. Request handlers hold cloned senders; the
//! emitter owns the single receiver.

use crate::domain::access_event::AccessEvent;
use tokio::sync::mpsc;

/// Creates the bounded access-event channel.
///
/// `capacity` should be sized to absorb broker-latency bursts: senders block
/// when the buffer is full, which shows up as request latency on the hot
/// path rather than as dropped events.
pub fn channel(capacity: usize) -> (AccessEventSender, AccessEventReceiver) {
    let (tx, rx) = mpsc::channel(capacity);
    (
        AccessEventSender { inner: tx },
        AccessEventReceiver { inner: rx },
    )
}

/// Producer half of the event channel.
///
/// Cloned into every request handler through the resolver service.
#[derive(Clone)]
pub struct AccessEventSender {
    inner: mpsc::Sender<AccessEvent>,
}

impl AccessEventSender {
    /// Enqueues an event, waiting for capacity when the channel is full.
    ///
    /// Delivery failures are never surfaced to the request path: if the
    /// receiver is gone (pipeline shut down), the event is logged and
    /// dropped.
    pub async fn send(&self, event: AccessEvent) {
        if let Err(e) = self.inner.send(event).await {
            metrics::counter!("linktrack_events_dropped_total").increment(1);
            tracing::warn!("Event channel closed, dropping access event: {}", e.0.url);
        }
    }

    /// Whether the receiving side has been dropped.
    pub fn is_closed(&self) -> bool {
        self.inner.is_closed()
    }

    /// Remaining free slots in the channel buffer.
    pub fn capacity(&self) -> usize {
        self.inner.capacity()
    }
}

/// Consumer half of the event channel, owned by the emitter task.
pub struct AccessEventReceiver {
    inner: mpsc::Receiver<AccessEvent>,
}

impl AccessEventReceiver {
    /// Receives the next event.
    ///
    /// Returns `None` once every sender has been dropped and the buffer is
    /// drained - that is the emitter's signal to flush and exit.
    pub async fn recv(&mut self) -> Option<AccessEvent> {
        self.inner.recv().await
    }

    /// Takes the next buffered event without waiting, if one is ready.
    pub fn try_recv(&mut self) -> Option<AccessEvent> {
        self.inner.try_recv().ok()
    }
}
