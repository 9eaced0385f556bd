//! Event Dispatcher
//!
//! A subscription mapping `event + source → dispatchable target`, with
//! optional payload/context filters (§3).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::{Executor, FromRow, Postgres};
use uuid::Uuid;

use crate::error::StoreError;

/// Closed-sum dispatch target. Keep the set closed — every new variant
/// must be added here and handled exhaustively downstream (§9).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DispatchableType {
    JobVersion,
    DynamicTrigger,
}

/// Wire shape of the `dispatchable` JSON column: `{type, id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dispatchable {
    #[serde(rename = "type")]
    pub kind: DispatchableType,
    pub id: Uuid,
}

#[derive(Debug, thiserror::Error)]
pub enum DispatchableParseError {
    #[error("dispatchable JSON is not {{type, id}} shaped: {0}")]
    Malformed(String),
}

impl Dispatchable {
    pub fn parse(value: &Value) -> Result<Self, DispatchableParseError> {
        serde_json::from_value(value.clone())
            .map_err(|e| DispatchableParseError::Malformed(e.to_string()))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct EventDispatcher {
    pub id: Uuid,
    pub environment_id: Uuid,
    pub event: String,
    pub source: String,
    pub payload_filter: Value,
    pub context_filter: Value,
    pub manual: bool,
    pub enabled: bool,
    pub dispatchable_id: Uuid,
    pub dispatchable: Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl EventDispatcher {
    pub fn dispatchable(&self) -> Result<Dispatchable, DispatchableParseError> {
        Dispatchable::parse(&self.dispatchable)
    }
}

/// Candidates for automatic delivery: enabled, non-manual, matching
/// `(environment_id, event, source)`, ordered `created_at ASC` (§4.5.2).
pub async fn find_automatic_candidates<'e, E>(
    executor: E,
    environment_id: Uuid,
    event: &str,
    source: &str,
) -> Result<Vec<EventDispatcher>, StoreError>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as::<_, EventDispatcher>(
        r#"
        SELECT * FROM event_dispatchers
        WHERE environment_id = $1 AND event = $2 AND source = $3
          AND enabled = true AND manual = false
        ORDER BY created_at ASC
        "#,
    )
    .bind(environment_id)
    .bind(event)
    .bind(source)
    .fetch_all(executor)
    .await
    .map_err(StoreError::from_sqlx)
}

pub async fn find_by_id<'e, E>(executor: E, id: Uuid) -> Result<Option<EventDispatcher>, StoreError>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as::<_, EventDispatcher>("SELECT * FROM event_dispatchers WHERE id = $1")
        .bind(id)
        .fetch_optional(executor)
        .await
        .map_err(StoreError::from_sqlx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn dispatchable_parses_job_version_shape() {
        let value = json!({"type": "JOB_VERSION", "id": Uuid::new_v4().to_string()});
        let dispatchable = Dispatchable::parse(&value).unwrap();
        assert_eq!(dispatchable.kind, DispatchableType::JobVersion);
    }

    #[test]
    fn dispatchable_rejects_unknown_type() {
        let value = json!({"type": "NOT_A_REAL_TYPE", "id": Uuid::new_v4().to_string()});
        assert!(Dispatchable::parse(&value).is_err());
    }
}
