//! The asynchronous access-event pipeline.
//!
//! Events flow: resolver -> [`channel`] -> [`emitter::Emitter`] -> broker topic
//! -> [`ingestor`] workers -> analytics store.
//!
//! The pipeline is fire-and-forget from the resolver's point of view: the
//! bounded channel provides backpressure on the request path, the emitter
//! publishes with leader-acknowledged batched writes, and the ingestor
//! workers share a consumer group so each partition is owned by exactly one
//! worker. Delivery is at-least-once; the analytics store counts
//! commutatively, so cross-partition ordering does not matter.

pub mod channel;
pub mod emitter;
pub mod ingestor;

pub use channel::{channel, AccessEventReceiver, AccessEventSender};
pub use emitter::Emitter;
pub use ingestor::{spawn_workers, FailurePolicy, IngestorSettings};
