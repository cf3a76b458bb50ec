//! PostgreSQL implementation of the alias repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::json;
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::entities::{Alias, NewAlias};
use crate::domain::repositories::AliasRepository;
use crate::error::{is_unique_violation, AppError};

/// PostgreSQL repository for alias storage and retrieval.
///
/// The `aliases.code` primary key enforces uniqueness; an insert that loses
/// a generation race surfaces as [`AppError::Validation`] so the service can
/// retry with a fresh code.
pub struct PgAliasRepository {
    pool: Arc<PgPool>,
}

#[derive(sqlx::FromRow)]
struct AliasRow {
    code: String,
    original_url: String,
    created_at: DateTime<Utc>,
}

impl From<AliasRow> for Alias {
    fn from(row: AliasRow) -> Self {
        Alias::new(row.code, row.original_url, row.created_at)
    }
}

impl PgAliasRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AliasRepository for PgAliasRepository {
    async fn save(&self, new_alias: NewAlias) -> Result<Alias, AppError> {
        let row = sqlx::query_as::<_, AliasRow>(
            r#"
            INSERT INTO aliases (code, original_url)
            VALUES ($1, $2)
            RETURNING code, original_url, created_at
            "#,
        )
        .bind(&new_alias.code)
        .bind(&new_alias.original_url)
        .fetch_one(self.pool.as_ref())
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::bad_request(
                    "Alias code already exists",
                    json!({ "code": new_alias.code }),
                )
            } else {
                e.into()
            }
        })?;

        Ok(row.into())
    }

    async fn get(&self, code: &str) -> Result<Option<Alias>, AppError> {
        let row = sqlx::query_as::<_, AliasRow>(
            r#"
            SELECT code, original_url, created_at
            FROM aliases
            WHERE code = $1
            "#,
        )
        .bind(code)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.map(Into::into))
    }

    async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1")
            .execute(self.pool.as_ref())
            .await
            .is_ok()
    }
}
