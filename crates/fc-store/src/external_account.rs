//! External Account
//!
//! Optional caller identity an ingested event can be attributed to.
//! Not-found during ingestion is logged and treated as null, never a
//! failure (§4.5.1).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::{Executor, FromRow, Postgres};
use uuid::Uuid;

use crate::error::StoreError;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ExternalAccount {
    pub id: Uuid,
    pub environment_id: Uuid,
    pub identifier: String,
    pub metadata: Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub async fn find_by_environment_and_identifier<'e, E>(
    executor: E,
    environment_id: Uuid,
    identifier: &str,
) -> Result<Option<ExternalAccount>, StoreError>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as::<_, ExternalAccount>(
        "SELECT * FROM external_accounts WHERE environment_id = $1 AND identifier = $2",
    )
    .bind(environment_id)
    .bind(identifier)
    .fetch_optional(executor)
    .await
    .map_err(StoreError::from_sqlx)
}
