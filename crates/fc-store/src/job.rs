//! Job
//!
//! Top-level job identity, shared across environments within a project.
//! Unique by `(project_id, slug)` (§3).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Executor, FromRow, Postgres};
use uuid::Uuid;

use crate::error::StoreError;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Job {
    pub id: Uuid,
    pub slug: String,
    pub title: String,
    pub internal: bool,
    pub organization_id: Uuid,
    pub project_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Upsert by `(project_id, slug)`. Existing rows keep their id; only
/// `title`, `internal`, `updated_at` change on conflict (§4.6.1 step 1).
pub async fn upsert<'e, E>(
    executor: E,
    project_id: Uuid,
    organization_id: Uuid,
    slug: &str,
    title: &str,
    internal: bool,
    now: DateTime<Utc>,
) -> Result<Job, StoreError>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as::<_, Job>(
        r#"
        INSERT INTO jobs (id, slug, title, internal, organization_id, project_id, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $7)
        ON CONFLICT (project_id, slug) DO UPDATE
            SET title = EXCLUDED.title, internal = EXCLUDED.internal, updated_at = EXCLUDED.updated_at
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(slug)
    .bind(title)
    .bind(internal)
    .bind(organization_id)
    .bind(project_id)
    .bind(now)
    .fetch_one(executor)
    .await
    .map_err(StoreError::from_sqlx)
}
