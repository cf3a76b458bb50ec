//! Repository trait for the durable alias map.

use crate::domain::entities::{Alias, NewAlias};
use crate::error::AppError;
use async_trait::async_trait;

/// The durable alias map: source of truth for short code mappings.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgAliasRepository`] - PostgreSQL implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AliasRepository: Send + Sync {
    /// Persists a new alias mapping.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if the code is already taken (the
    /// service retries generation on this), [`AppError::Storage`] on other
    /// database errors.
    async fn save(&self, new_alias: NewAlias) -> Result<Alias, AppError>;

    /// Looks up an alias by its short code.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(Alias))` if found
    /// - `Ok(None)` if not found
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Storage`] on database errors.
    async fn get(&self, code: &str) -> Result<Option<Alias>, AppError>;

    /// Checks whether the durable map is reachable.
    ///
    /// Used by the health endpoint.
    async fn health_check(&self) -> bool;
}
