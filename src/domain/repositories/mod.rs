//! Repository trait definitions for the domain layer.
//!
//! This module defines the repository interfaces (traits) that abstract data access
//! operations following the Repository pattern. These traits are implemented by
//! concrete repositories in the infrastructure layer.
//!
//! # Architecture
//!
//! - Traits define the contract for data operations
//! - Implementations live in `crate::infrastructure`
//! - Mock implementations are auto-generated via `mockall` for testing
//!
//! # Available Repositories
//!
//! - [`AliasRepository`] - The durable alias map (save/get)
//! - [`AnalyticsRepository`] - Raw access-event log plus merged counters

pub mod alias_repository;
pub mod analytics_repository;

pub use alias_repository::AliasRepository;
pub use analytics_repository::AnalyticsRepository;

#[cfg(test)]
pub use alias_repository::MockAliasRepository;
#[cfg(test)]
pub use analytics_repository::MockAnalyticsRepository;
