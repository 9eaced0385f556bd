//! Store-backed lookups the auth resolver needs. Implemented by
//! `fc-store`; kept as a trait here so `fc-auth` stays storage-agnostic.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::environment::AuthenticatedEnvironment;

/// Which store-backed credential kind resolved the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    ApiKeyPublic,
    ApiKeyPrivate,
    PublicJwt,
    PersonalAccessToken,
    OrganizationAccessToken,
}

#[async_trait]
pub trait AuthStore: Send + Sync {
    /// Resolve an API key to its environment. Private keys may resolve
    /// any environment; callers enforce the production-only restriction
    /// for public keys themselves (§4.1) since the store has no opinion
    /// on category.
    async fn find_environment_by_api_key(
        &self,
        api_key: &str,
    ) -> Result<Option<AuthenticatedEnvironment>, String>;

    async fn find_environment_by_id(
        &self,
        environment_id: Uuid,
    ) -> Result<Option<AuthenticatedEnvironment>, String>;

    /// Resolve a Personal Access Token to an environment.
    async fn find_environment_by_personal_access_token(
        &self,
        token: &str,
    ) -> Result<Option<AuthenticatedEnvironment>, String>;

    /// Resolve an Organization Access Token to an environment.
    async fn find_environment_by_organization_access_token(
        &self,
        token: &str,
    ) -> Result<Option<AuthenticatedEnvironment>, String>;

    /// Stamp `last_used_at` on a token. Failure here is logged and
    /// ignored by the caller — never fails authentication (§9).
    async fn stamp_token_last_used(
        &self,
        kind: TokenKind,
        token: &str,
        at: DateTime<Utc>,
    ) -> Result<(), String>;
}
