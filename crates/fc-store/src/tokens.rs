//! Personal / Organization Access Tokens
//!
//! Each token type has its own store lookup and `last_used_at` stamp
//! (§4.1). Lookups resolve straight to an `AuthenticatedEnvironment` via
//! the same environment join `fc_auth::AuthStore` needs.

use chrono::{DateTime, Utc};
use fc_auth::AuthenticatedEnvironment;
use sqlx::{Executor, Postgres};

use crate::environment;
use crate::error::StoreError;

pub async fn find_environment_by_personal_access_token<'e, E>(
    executor: E,
    token: &str,
) -> Result<Option<AuthenticatedEnvironment>, StoreError>
where
    E: Executor<'e, Database = Postgres> + Copy,
{
    let row: Option<(uuid::Uuid,)> = sqlx::query_as(
        "SELECT environment_id FROM personal_access_tokens WHERE token = $1",
    )
    .bind(token)
    .fetch_optional(executor)
    .await
    .map_err(StoreError::from_sqlx)?;

    match row {
        Some((environment_id,)) => environment::find_by_id(executor, environment_id).await,
        None => Ok(None),
    }
}

pub async fn find_environment_by_organization_access_token<'e, E>(
    executor: E,
    token: &str,
) -> Result<Option<AuthenticatedEnvironment>, StoreError>
where
    E: Executor<'e, Database = Postgres> + Copy,
{
    let row: Option<(uuid::Uuid,)> = sqlx::query_as(
        r#"
        SELECT e.id FROM organization_access_tokens t
        JOIN runtime_environments e ON e.organization_id = t.organization_id
        WHERE t.token = $1
        ORDER BY e.created_at ASC
        LIMIT 1
        "#,
    )
    .bind(token)
    .fetch_optional(executor)
    .await
    .map_err(StoreError::from_sqlx)?;

    match row {
        Some((environment_id,)) => environment::find_by_id(executor, environment_id).await,
        None => Ok(None),
    }
}

pub async fn stamp_personal_access_token_last_used<'e, E>(
    executor: E,
    token: &str,
    at: DateTime<Utc>,
) -> Result<(), StoreError>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query("UPDATE personal_access_tokens SET last_used_at = $1 WHERE token = $2")
        .bind(at)
        .bind(token)
        .execute(executor)
        .await
        .map_err(StoreError::from_sqlx)?;
    Ok(())
}

pub async fn stamp_organization_access_token_last_used<'e, E>(
    executor: E,
    token: &str,
    at: DateTime<Utc>,
) -> Result<(), StoreError>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query("UPDATE organization_access_tokens SET last_used_at = $1 WHERE token = $2")
        .bind(at)
        .bind(token)
        .execute(executor)
        .await
        .map_err(StoreError::from_sqlx)?;
    Ok(())
}
