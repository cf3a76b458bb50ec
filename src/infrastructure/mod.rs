//! Infrastructure layer: concrete integrations behind the domain traits.
//!
//! - [`cache`] - Redis-backed alias cache with a no-op fallback
//! - [`persistence`] - PostgreSQL implementation of the durable alias map
//! - [`analytics`] - ClickHouse raw-event log and merged counters

pub mod analytics;
pub mod cache;
pub mod persistence;
