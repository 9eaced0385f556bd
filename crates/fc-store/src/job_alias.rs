//! Job Alias
//!
//! A named pointer onto a `JobVersion` for a `(job, environment)` pair.
//! The `latest` alias always points at the most recently registered
//! version, by lexicographic `version` comparison (§3, §4.6.1 step 5).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Executor, FromRow, Postgres};
use uuid::Uuid;

use crate::error::StoreError;

pub const LATEST_ALIAS_NAME: &str = "latest";

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct JobAlias {
    pub id: Uuid,
    pub job_id: Uuid,
    pub environment_id: Uuid,
    pub name: String,
    pub version_id: Uuid,
    pub value: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Upsert by `(job_id, environment_id, name)`.
pub async fn upsert<'e, E>(
    executor: E,
    job_id: Uuid,
    environment_id: Uuid,
    name: &str,
    version_id: Uuid,
    value: &str,
    now: DateTime<Utc>,
) -> Result<JobAlias, StoreError>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as::<_, JobAlias>(
        r#"
        INSERT INTO job_aliases (id, job_id, environment_id, name, version_id, value, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $7)
        ON CONFLICT (job_id, environment_id, name) DO UPDATE
            SET version_id = EXCLUDED.version_id, value = EXCLUDED.value, updated_at = EXCLUDED.updated_at
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(job_id)
    .bind(environment_id)
    .bind(name)
    .bind(version_id)
    .bind(value)
    .bind(now)
    .fetch_one(executor)
    .await
    .map_err(StoreError::from_sqlx)
}
