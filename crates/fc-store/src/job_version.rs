//! Job Version
//!
//! A single registered version of a job: the event specification that
//! gates it, its trigger properties, and where it starts consuming from
//! (§3).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::{Executor, FromRow, Postgres};
use uuid::Uuid;

use crate::error::StoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum StartPosition {
    Initial,
    Latest,
}

impl StartPosition {
    pub fn from_request_str(value: Option<&str>) -> Self {
        match value {
            Some("latest") => Self::Latest,
            _ => Self::Initial,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct JobVersion {
    pub id: Uuid,
    pub job_id: Uuid,
    pub version: String,
    pub event_specification: Value,
    pub properties: Value,
    pub endpoint_id: Option<Uuid>,
    pub environment_id: Uuid,
    pub organization_id: Uuid,
    pub project_id: Uuid,
    pub queue_id: Uuid,
    pub start_position: String,
    pub preprocess_runs: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The `{name, source}` shape stored in `event_specification` (§3, §4.6.2).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventSpecification {
    pub name: String,
    #[serde(default)]
    pub source: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum EventSpecificationError {
    #[error("event_specification missing required field: {0}")]
    Malformed(String),
}

impl JobVersion {
    pub fn parse_event_specification(&self) -> Result<EventSpecification, EventSpecificationError> {
        let name = self
            .event_specification
            .get("name")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| EventSpecificationError::Malformed("name".to_string()))?;
        let source = self
            .event_specification
            .get("source")
            .and_then(Value::as_str)
            .map(String::from);
        Ok(EventSpecification {
            name: name.to_string(),
            source,
        })
    }
}

/// Upsert by `(job_id, version, environment_id)` (§4.6.1 step 3).
#[allow(clippy::too_many_arguments)]
pub async fn upsert<'e, E>(
    executor: E,
    job_id: Uuid,
    version: &str,
    event_specification: Value,
    properties: Value,
    endpoint_id: Option<Uuid>,
    environment_id: Uuid,
    organization_id: Uuid,
    project_id: Uuid,
    queue_id: Uuid,
    start_position: StartPosition,
    preprocess_runs: bool,
    now: DateTime<Utc>,
) -> Result<JobVersion, StoreError>
where
    E: Executor<'e, Database = Postgres>,
{
    let start_position_str = match start_position {
        StartPosition::Initial => "INITIAL",
        StartPosition::Latest => "LATEST",
    };

    sqlx::query_as::<_, JobVersion>(
        r#"
        INSERT INTO job_versions
            (id, job_id, version, event_specification, properties, endpoint_id, environment_id,
             organization_id, project_id, queue_id, start_position, preprocess_runs, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $13)
        ON CONFLICT (job_id, version, environment_id) DO UPDATE
            SET event_specification = EXCLUDED.event_specification,
                properties = EXCLUDED.properties,
                endpoint_id = EXCLUDED.endpoint_id,
                queue_id = EXCLUDED.queue_id,
                start_position = EXCLUDED.start_position,
                preprocess_runs = EXCLUDED.preprocess_runs,
                updated_at = EXCLUDED.updated_at
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(job_id)
    .bind(version)
    .bind(event_specification)
    .bind(properties)
    .bind(endpoint_id)
    .bind(environment_id)
    .bind(organization_id)
    .bind(project_id)
    .bind(queue_id)
    .bind(start_position_str)
    .bind(preprocess_runs)
    .bind(now)
    .fetch_one(executor)
    .await
    .map_err(StoreError::from_sqlx)
}

/// Count sibling versions for `(job_id, environment_id)` whose `version`
/// string sorts lexicographically greater than `version` (§4.6.1 step 5).
///
/// Lexicographic, not semver, comparison — matches source behavior; see
/// the open question recorded in DESIGN.md.
pub async fn count_lexicographically_newer<'e, E>(
    executor: E,
    job_id: Uuid,
    environment_id: Uuid,
    version: &str,
) -> Result<i64, StoreError>
where
    E: Executor<'e, Database = Postgres>,
{
    let row: (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM job_versions WHERE job_id = $1 AND environment_id = $2 AND version > $3",
    )
    .bind(job_id)
    .bind(environment_id)
    .bind(version)
    .fetch_one(executor)
    .await
    .map_err(StoreError::from_sqlx)?;
    Ok(row.0)
}

pub async fn find_by_id<'e, E>(executor: E, id: Uuid) -> Result<Option<JobVersion>, StoreError>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as::<_, JobVersion>("SELECT * FROM job_versions WHERE id = $1")
        .bind(id)
        .fetch_optional(executor)
        .await
        .map_err(StoreError::from_sqlx)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_position_defaults_to_initial() {
        assert_eq!(StartPosition::from_request_str(None), StartPosition::Initial);
        assert_eq!(StartPosition::from_request_str(Some("initial")), StartPosition::Initial);
    }

    #[test]
    fn start_position_latest_is_explicit() {
        assert_eq!(StartPosition::from_request_str(Some("latest")), StartPosition::Latest);
    }
}
