//! Core domain entities representing the business data model.
//!
//! Entities are plain data structures without business logic.
//!
//! # Entity Types
//!
//! - [`Alias`] - A short code mapped to an original URL
//!
//! # Design Pattern
//!
//! Entities follow the "New Type" pattern with a separate struct for creation:
//! `NewAlias` carries the fields chosen by the service before the durable map
//! assigns storage metadata.

pub mod alias;

pub use alias::{Alias, NewAlias};
