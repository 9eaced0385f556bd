//! Runtime Environment Lookup
//!
//! Resolves the `(environment, project, organization)` join that backs
//! `AuthenticatedEnvironment` (§3). Lives in `fc-store` because it's a
//! read over the relational schema; the shape itself is owned by
//! `fc-auth`.

use fc_auth::{AuthenticatedEnvironment, EnvironmentType};
use sqlx::{Executor, FromRow, Postgres};
use uuid::Uuid;

use crate::error::StoreError;

#[derive(Debug, Clone, FromRow)]
struct EnvironmentRow {
    environment_id: Uuid,
    organization_id: Uuid,
    project_id: Uuid,
    environment_slug: String,
    api_key: String,
    environment_type: String,
    project_slug: String,
    project_name: String,
    org_slug: String,
    org_title: String,
}

impl EnvironmentRow {
    fn into_authenticated_environment(self) -> AuthenticatedEnvironment {
        let environment_type = match self.environment_type.as_str() {
            "PRODUCTION" => EnvironmentType::Production,
            "STAGING" => EnvironmentType::Staging,
            "PREVIEW" => EnvironmentType::Preview,
            _ => EnvironmentType::Development,
        };
        AuthenticatedEnvironment {
            environment_id: self.environment_id,
            organization_id: self.organization_id,
            project_id: self.project_id,
            environment_slug: self.environment_slug,
            api_key: self.api_key,
            environment_type,
            project_slug: self.project_slug,
            project_name: self.project_name,
            org_slug: self.org_slug,
            org_title: self.org_title,
        }
    }
}

const SELECT_JOIN: &str = r#"
    SELECT
        e.id AS environment_id,
        o.id AS organization_id,
        p.id AS project_id,
        e.slug AS environment_slug,
        e.api_key AS api_key,
        e.environment_type AS environment_type,
        p.slug AS project_slug,
        p.name AS project_name,
        o.slug AS org_slug,
        o.title AS org_title
    FROM runtime_environments e
    JOIN projects p ON p.id = e.project_id
    JOIN organizations o ON o.id = p.organization_id
"#;

pub async fn find_by_api_key<'e, E>(
    executor: E,
    api_key: &str,
) -> Result<Option<AuthenticatedEnvironment>, StoreError>
where
    E: Executor<'e, Database = Postgres>,
{
    let query = format!("{SELECT_JOIN} WHERE e.api_key = $1");
    let row = sqlx::query_as::<_, EnvironmentRow>(&query)
        .bind(api_key)
        .fetch_optional(executor)
        .await
        .map_err(StoreError::from_sqlx)?;
    Ok(row.map(EnvironmentRow::into_authenticated_environment))
}

pub async fn find_by_id<'e, E>(
    executor: E,
    environment_id: Uuid,
) -> Result<Option<AuthenticatedEnvironment>, StoreError>
where
    E: Executor<'e, Database = Postgres>,
{
    let query = format!("{SELECT_JOIN} WHERE e.id = $1");
    let row = sqlx::query_as::<_, EnvironmentRow>(&query)
        .bind(environment_id)
        .fetch_optional(executor)
        .await
        .map_err(StoreError::from_sqlx)?;
    Ok(row.map(EnvironmentRow::into_authenticated_environment))
}
