//! ClickHouse implementation of the analytics repository.
//!
//! Two physical structures back the store:
//!
//! - `source` - the append-only raw-event log, one row per delivered event
//! - `counters` - an AggregatingMergeTree of partial sums keyed by
//!   `(id, user_id)`, fed by the `counters_mv` materialized view which
//!   extracts `url` / `user_id` from each raw JSON value by name
//!
//! Reads merge the partial sums (`sumMerge`) instead of rescanning the raw
//! log. The aggregate is commutative, so ingestion order and concurrent
//! writers never affect the merged result.

use async_trait::async_trait;
use clickhouse::{Client, Row};
use serde::Serialize;
use serde_json::json;
use tracing::{debug, info};

use crate::domain::access_event::AccessEvent;
use crate::domain::repositories::AnalyticsRepository;
use crate::error::AppError;

/// Idempotent schema bootstrap, run once at startup.
const SCHEMA: &[&str] = &[
    r#"CREATE TABLE IF NOT EXISTS source (
        value String
    ) ENGINE = MergeTree()
    ORDER BY tuple()"#,
    r#"CREATE TABLE IF NOT EXISTS counters (
        id String,
        user_id Int64,
        counter AggregateFunction(sum, Int64)
    ) ENGINE = AggregatingMergeTree()
    ORDER BY (id, user_id)"#,
    r#"CREATE MATERIALIZED VIEW IF NOT EXISTS counters_mv TO counters
    AS SELECT
        JSONExtractString(value, 'url') AS id,
        JSONExtractInt(value, 'user_id') AS user_id,
        sumState(toInt64(1)) AS counter
    FROM source
    GROUP BY id, user_id"#,
];

#[derive(Row, Serialize)]
struct RawEventRow {
    value: String,
}

/// ClickHouse-backed analytics store.
pub struct ClickHouseStore {
    client: Client,
}

impl ClickHouseStore {
    /// Creates a client handle. No I/O happens until the first query.
    pub fn new(url: &str, database: &str, user: &str, password: &str) -> Self {
        let client = Client::default()
            .with_url(url)
            .with_database(database)
            .with_user(user)
            .with_password(password);

        Self { client }
    }

    /// Creates the raw-event table, the counter table, and the materialized
    /// view that maintains it. All statements are `IF NOT EXISTS`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Storage`] if any DDL statement fails.
    pub async fn init_schema(&self) -> Result<(), AppError> {
        for ddl in SCHEMA {
            self.client
                .query(ddl)
                .execute()
                .await
                .map_err(storage_error)?;
        }

        info!("Analytics schema ready");
        Ok(())
    }
}

/// Serialized raw value for one access; the materialized view extracts the
/// `url` and `user_id` fields from this JSON by name.
fn raw_value(user_id: i64, url: &str) -> Result<String, AppError> {
    serde_json::to_string(&AccessEvent {
        url: url.to_string(),
        user_id,
    })
    .map_err(|e| {
        AppError::internal(
            "Failed to serialize raw event",
            json!({ "reason": e.to_string() }),
        )
    })
}

fn storage_error(e: clickhouse::error::Error) -> AppError {
    AppError::storage("Analytics store error", json!({ "reason": e.to_string() }))
}

#[async_trait]
impl AnalyticsRepository for ClickHouseStore {
    async fn record_access(&self, user_id: i64, url: &str) -> Result<(), AppError> {
        let row = RawEventRow {
            value: raw_value(user_id, url)?,
        };

        let mut insert = self.client.insert("source").map_err(storage_error)?;
        insert.write(&row).await.map_err(storage_error)?;
        insert.end().await.map_err(storage_error)?;

        debug!("Raw access event stored (url: {}, user_id: {})", url, user_id);
        Ok(())
    }

    async fn url_stats(&self, url: &str) -> Result<i64, AppError> {
        let total = self
            .client
            .query("SELECT sumMerge(counter) FROM counters WHERE id = ? AND user_id = 0")
            .bind(url)
            .fetch_optional::<i64>()
            .await
            .map_err(storage_error)?;

        Ok(total.unwrap_or(0))
    }

    async fn has_accessed(&self, url: &str, user_id: i64) -> Result<bool, AppError> {
        let count = self
            .client
            .query("SELECT count() FROM counters WHERE id = ? AND user_id = ?")
            .bind(url)
            .bind(user_id)
            .fetch_one::<u64>()
            .await
            .map_err(storage_error)?;

        Ok(count > 0)
    }

    async fn health_check(&self) -> bool {
        self.client
            .query("SELECT 1")
            .fetch_one::<u8>()
            .await
            .is_ok()
    }
}
