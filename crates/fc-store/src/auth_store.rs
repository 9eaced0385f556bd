//! `fc_auth::AuthStore` implementation backed by the Postgres pool.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use fc_auth::{AuthStore, AuthenticatedEnvironment, TokenKind};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{environment, tokens};

pub struct PgAuthStore {
    pool: PgPool,
}

impl PgAuthStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AuthStore for PgAuthStore {
    async fn find_environment_by_api_key(
        &self,
        api_key: &str,
    ) -> Result<Option<AuthenticatedEnvironment>, String> {
        environment::find_by_api_key(&self.pool, api_key)
            .await
            .map_err(|e| e.to_string())
    }

    async fn find_environment_by_id(
        &self,
        environment_id: Uuid,
    ) -> Result<Option<AuthenticatedEnvironment>, String> {
        environment::find_by_id(&self.pool, environment_id)
            .await
            .map_err(|e| e.to_string())
    }

    async fn find_environment_by_personal_access_token(
        &self,
        token: &str,
    ) -> Result<Option<AuthenticatedEnvironment>, String> {
        tokens::find_environment_by_personal_access_token(&self.pool, token)
            .await
            .map_err(|e| e.to_string())
    }

    async fn find_environment_by_organization_access_token(
        &self,
        token: &str,
    ) -> Result<Option<AuthenticatedEnvironment>, String> {
        tokens::find_environment_by_organization_access_token(&self.pool, token)
            .await
            .map_err(|e| e.to_string())
    }

    /// API keys and PUBLIC_JWT have no `last_used_at` column in the
    /// schema (§6) — only PAT/OAT do. Those variants no-op here.
    async fn stamp_token_last_used(
        &self,
        kind: TokenKind,
        token: &str,
        at: DateTime<Utc>,
    ) -> Result<(), String> {
        match kind {
            TokenKind::PersonalAccessToken => {
                tokens::stamp_personal_access_token_last_used(&self.pool, token, at)
                    .await
                    .map_err(|e| e.to_string())
            }
            TokenKind::OrganizationAccessToken => {
                tokens::stamp_organization_access_token_last_used(&self.pool, token, at)
                    .await
                    .map_err(|e| e.to_string())
            }
            TokenKind::ApiKeyPublic | TokenKind::ApiKeyPrivate | TokenKind::PublicJwt => Ok(()),
        }
    }
}
