//! Alias creation and resolution service.

use std::sync::Arc;

use crate::domain::access_event::AccessEvent;
use crate::domain::entities::{Alias, NewAlias};
use crate::domain::repositories::AliasRepository;
use crate::error::AppError;
use crate::infrastructure::cache::CacheService;
use crate::pipeline::AccessEventSender;
use crate::utils::code_generator::generate_code;
use serde_json::json;
use tracing::{debug, error, warn};

/// Service for creating and resolving short aliases.
///
/// Implements the cache-aside pattern over the durable alias map and emits
/// one [`AccessEvent`] per operation onto the pipeline channel. Emission
/// uses a blocking send: when the channel is full the request waits instead
/// of dropping the event, so channel capacity should absorb broker-latency
/// bursts.
pub struct ShortenerService {
    aliases: Arc<dyn AliasRepository>,
    cache: Arc<dyn CacheService>,
    events: AccessEventSender,
    cache_ttl_seconds: u64,
}

impl ShortenerService {
    /// Creates a new shortener service.
    pub fn new(
        aliases: Arc<dyn AliasRepository>,
        cache: Arc<dyn CacheService>,
        events: AccessEventSender,
        cache_ttl_seconds: u64,
    ) -> Self {
        Self {
            aliases,
            cache,
            events,
            cache_ttl_seconds,
        }
    }

    /// Creates a short alias for `original_url` on behalf of `user_id`.
    ///
    /// Writes the mapping to the durable map first, then to the cache with
    /// the configured TTL, then emits the access event. A durable-map
    /// failure fails the request and emits nothing; a cache failure is
    /// logged and the request still succeeds - availability over cache
    /// consistency.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Storage`] if the durable write fails, or
    /// [`AppError::Internal`] if code generation keeps colliding.
    pub async fn create_alias(
        &self,
        original_url: &str,
        user_id: i64,
    ) -> Result<String, AppError> {
        let alias = self.save_with_unique_code(original_url).await?;

        if let Err(e) = self
            .cache
            .set(
                &alias.code,
                &alias.original_url,
                Some(self.cache_ttl_seconds),
            )
            .await
        {
            warn!("Failed to cache new alias {}: {}", alias.code, e);
        }

        self.events
            .send(AccessEvent::created(&alias.code, user_id))
            .await;

        Ok(alias.code)
    }

    /// Resolves a short code to its original URL.
    ///
    /// The access event is emitted before any lookup and regardless of the
    /// outcome, always with `user_id = 0`: resolution is anonymous in this
    /// design, so per-user resolve analytics is not available (documented
    /// limitation). Lookup checks the cache first and falls through to the
    /// durable map on miss or cache error; a durable-map hit is written back
    /// to the cache on a detached task.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the code is absent from both the
    /// cache and the durable map, [`AppError::Storage`] on durable-map
    /// errors.
    pub async fn resolve_alias(&self, code: &str) -> Result<String, AppError> {
        self.events.send(AccessEvent::resolved(code)).await;

        match self.cache.get(code).await {
            Ok(Some(url)) if !url.is_empty() => {
                debug!("Cache HIT for {}", code);
                return Ok(url);
            }
            Ok(_) => debug!("Cache MISS for {}", code),
            Err(e) => warn!("Cache error for {}, falling back to storage: {}", code, e),
        }

        let alias = self
            .aliases
            .get(code)
            .await?
            .ok_or_else(|| AppError::not_found("Short code not found", json!({ "code": code })))?;

        // Refill the cache without delaying the response.
        let cache = self.cache.clone();
        let key = alias.code.clone();
        let url = alias.original_url.clone();
        let ttl = self.cache_ttl_seconds;
        tokio::spawn(async move {
            if let Err(e) = cache.set(&key, &url, Some(ttl)).await {
                error!("Failed to refill cache for {}: {}", key, e);
            }
        });

        Ok(alias.original_url)
    }

    /// Generates a code and saves the mapping, retrying on collision.
    ///
    /// Each attempt checks the durable map before inserting; an insert-time
    /// unique violation (two creates racing on the same code) also counts as
    /// a collision. Attempts are bounded so a pathological keyspace cannot
    /// loop forever.
    async fn save_with_unique_code(&self, original_url: &str) -> Result<Alias, AppError> {
        const MAX_ATTEMPTS: usize = 10;

        for _ in 0..MAX_ATTEMPTS {
            let code = generate_code();

            if self.aliases.get(&code).await?.is_some() {
                continue;
            }

            match self
                .aliases
                .save(NewAlias {
                    code,
                    original_url: original_url.to_string(),
                })
                .await
            {
                Ok(alias) => return Ok(alias),
                // Lost the race on the unique index; pick a new code.
                Err(AppError::Validation { .. }) => continue,
                Err(e) => return Err(e),
            }
        }

        Err(AppError::internal(
            "Failed to generate unique code",
            json!({ "reason": "Too many collisions" }),
        ))
    }
}
