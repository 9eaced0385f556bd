//! Job Queue
//!
//! Concurrency-limiting bucket a `JobVersion` runs within. Unique by
//! `(environment_id, name)`; `job_count` never goes negative (§3).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Executor, FromRow, Postgres};
use uuid::Uuid;

use crate::error::StoreError;

pub const DEFAULT_QUEUE_NAME: &str = "default";
pub const DEFAULT_MAX_JOBS: i32 = 100;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct JobQueue {
    pub id: Uuid,
    pub name: String,
    pub environment_id: Uuid,
    pub job_count: i32,
    pub max_jobs: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Upsert by `(environment_id, name)`. On conflict, only `max_jobs` and
/// `updated_at` change — `job_count` is preserved (§4.6.1 step 2).
pub async fn upsert<'e, E>(
    executor: E,
    environment_id: Uuid,
    name: &str,
    max_jobs: i32,
    now: DateTime<Utc>,
) -> Result<JobQueue, StoreError>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as::<_, JobQueue>(
        r#"
        INSERT INTO job_queues (id, name, environment_id, job_count, max_jobs, created_at, updated_at)
        VALUES ($1, $2, $3, 0, $4, $5, $5)
        ON CONFLICT (environment_id, name) DO UPDATE
            SET max_jobs = EXCLUDED.max_jobs, updated_at = EXCLUDED.updated_at
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(name)
    .bind(environment_id)
    .bind(max_jobs)
    .bind(now)
    .fetch_one(executor)
    .await
    .map_err(StoreError::from_sqlx)
}
