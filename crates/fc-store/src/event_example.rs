//! Event Example
//!
//! Sample payloads attached to a `JobVersion` for UI/testing purposes.
//! Reconciled wholesale on each `RegisterJob` call: upsert the submitted
//! set, then delete anything for the version not in it (§4.6.1 step 4).

use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::{Executor, FromRow, Postgres};
use uuid::Uuid;

use crate::error::StoreError;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct EventExample {
    pub id: Uuid,
    pub job_version_id: Uuid,
    pub slug: String,
    pub name: String,
    pub icon: Option<String>,
    pub payload: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventExampleInput {
    pub slug: String,
    pub name: String,
    pub icon: Option<String>,
    pub payload: Value,
}

pub async fn upsert<'e, E>(
    executor: E,
    job_version_id: Uuid,
    input: &EventExampleInput,
) -> Result<EventExample, StoreError>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as::<_, EventExample>(
        r#"
        INSERT INTO event_examples (id, job_version_id, slug, name, icon, payload)
        VALUES ($1, $2, $3, $4, $5, $6)
        ON CONFLICT (job_version_id, slug) DO UPDATE
            SET name = EXCLUDED.name, icon = EXCLUDED.icon, payload = EXCLUDED.payload
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(job_version_id)
    .bind(&input.slug)
    .bind(&input.name)
    .bind(&input.icon)
    .bind(&input.payload)
    .fetch_one(executor)
    .await
    .map_err(StoreError::from_sqlx)
}

/// Delete all examples for `job_version_id` whose slug is not in
/// `kept_slugs` (§4.6.1 step 4).
pub async fn delete_not_in<'e, E>(
    executor: E,
    job_version_id: Uuid,
    kept_slugs: &[String],
) -> Result<(), StoreError>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query("DELETE FROM event_examples WHERE job_version_id = $1 AND NOT (slug = ANY($2))")
        .bind(job_version_id)
        .bind(kept_slugs)
        .execute(executor)
        .await
        .map_err(StoreError::from_sqlx)?;
    Ok(())
}
