//! Event Record
//!
//! One durable record per ingested event. Immutable once created, except
//! for the single null → timestamp transition of `delivered_at`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::{Executor, FromRow, Postgres};
use uuid::Uuid;

use crate::error::StoreError;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct EventRecord {
    pub id: Uuid,
    pub event_id: String,
    pub name: String,
    pub source: String,
    pub payload: Value,
    pub context: Value,
    pub timestamp: DateTime<Utc>,
    pub environment_id: Uuid,
    pub organization_id: Uuid,
    pub project_id: Uuid,
    pub external_account_id: Option<Uuid>,
    pub deliver_at: DateTime<Utc>,
    pub delivered_at: Option<DateTime<Utc>>,
    pub is_test: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl EventRecord {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: Uuid,
        event_id: impl Into<String>,
        name: impl Into<String>,
        source: impl Into<String>,
        payload: Value,
        context: Value,
        environment_id: Uuid,
        organization_id: Uuid,
        project_id: Uuid,
        deliver_at: DateTime<Utc>,
        is_test: bool,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            event_id: event_id.into(),
            name: name.into(),
            source: source.into(),
            payload,
            context,
            timestamp: now,
            environment_id,
            organization_id,
            project_id,
            external_account_id: None,
            deliver_at,
            delivered_at: None,
            is_test,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_external_account_id(mut self, id: Option<Uuid>) -> Self {
        self.external_account_id = id;
        self
    }
}

/// Insert a new `EventRecord`, returning `Err(StoreError::Conflict)` on a
/// `(event_id, environment_id)` unique violation so callers can recover
/// the idempotent-insert path (§4.5.1, §9).
pub async fn insert<'e, E>(executor: E, record: &EventRecord) -> Result<EventRecord, StoreError>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as::<_, EventRecord>(
        r#"
        INSERT INTO event_records
            (id, event_id, name, source, payload, context, timestamp, environment_id,
             organization_id, project_id, external_account_id, deliver_at, delivered_at,
             is_test, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
        RETURNING *
        "#,
    )
    .bind(record.id)
    .bind(&record.event_id)
    .bind(&record.name)
    .bind(&record.source)
    .bind(&record.payload)
    .bind(&record.context)
    .bind(record.timestamp)
    .bind(record.environment_id)
    .bind(record.organization_id)
    .bind(record.project_id)
    .bind(record.external_account_id)
    .bind(record.deliver_at)
    .bind(record.delivered_at)
    .bind(record.is_test)
    .bind(record.created_at)
    .bind(record.updated_at)
    .fetch_one(executor)
    .await
    .map_err(StoreError::from_sqlx)
}

pub async fn find_by_event_id_and_environment<'e, E>(
    executor: E,
    event_id: &str,
    environment_id: Uuid,
) -> Result<Option<EventRecord>, StoreError>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as::<_, EventRecord>(
        "SELECT * FROM event_records WHERE event_id = $1 AND environment_id = $2",
    )
    .bind(event_id)
    .bind(environment_id)
    .fetch_optional(executor)
    .await
    .map_err(StoreError::from_sqlx)
}

pub async fn find_by_id<'e, E>(executor: E, id: Uuid) -> Result<Option<EventRecord>, StoreError>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as::<_, EventRecord>("SELECT * FROM event_records WHERE id = $1")
        .bind(id)
        .fetch_optional(executor)
        .await
        .map_err(StoreError::from_sqlx)
}

/// Conditional update: only stamps `delivered_at` if still null. Zero
/// rows affected means a concurrent `DeliverEvent` already won (§5).
pub async fn mark_delivered_if_pending<'e, E>(
    executor: E,
    id: Uuid,
    now: DateTime<Utc>,
) -> Result<bool, StoreError>
where
    E: Executor<'e, Database = Postgres>,
{
    let result = sqlx::query(
        "UPDATE event_records SET delivered_at = $1, updated_at = $1 WHERE id = $2 AND delivered_at IS NULL",
    )
    .bind(now)
    .bind(id)
    .execute(executor)
    .await
    .map_err(StoreError::from_sqlx)?;

    Ok(result.rows_affected() > 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_record_has_no_delivered_at() {
        let now = Utc::now();
        let record = EventRecord::new(
            Uuid::new_v4(),
            "E1",
            "order.placed",
            "api",
            serde_json::json!({}),
            serde_json::json!({}),
            Uuid::new_v4(),
            Uuid::new_v4(),
            Uuid::new_v4(),
            now,
            false,
            now,
        );
        assert!(record.delivered_at.is_none());
    }
}
