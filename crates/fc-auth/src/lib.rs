//! Auth Resolver
//!
//! Resolves request credentials (API keys, Personal/Organization Access
//! Tokens, PUBLIC_JWT) to an [`AuthenticatedEnvironment`], the tenancy
//! boundary every downstream operation is scoped to.
//!
//! Shape errors (malformed header, disallowed key category) are returned
//! as `AuthenticationResult::Failure` rather than `Err` — only store/IO
//! errors propagate as [`AuthError`]. A caller-facing middleware layer
//! maps the former to 401 and the latter to 500 (§4.1, §7).

pub mod environment;
pub mod error;
pub mod jwt;
pub mod key_classifier;
pub mod store;

use chrono::Utc;
use tracing::warn;

pub use environment::{AuthenticatedEnvironment, EnvironmentType};
pub use error::{AuthError, AuthFailureKind};
pub use jwt::{Expiration, GenerateTokenOptions, JwtSigner};
pub use key_classifier::{KeyCategory, KeyFormatError};
pub use store::{AuthStore, TokenKind};

/// Outcome of an authentication attempt — `success=true` carries the
/// resolved environment, key category, and any JWT-surfaced flags;
/// `success=false` carries a machine-readable error kind (§4.1).
#[derive(Debug, Clone)]
pub enum AuthenticationResult {
    Success {
        environment: AuthenticatedEnvironment,
        token_kind: TokenKind,
        scopes: Vec<String>,
        otu: bool,
        realtime: bool,
    },
    Failure {
        kind: AuthFailureKind,
    },
}

impl AuthenticationResult {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    pub fn failure(kind: AuthFailureKind) -> Self {
        Self::Failure { kind }
    }
}

/// Gates which key categories `AuthenticateAPIRequest` will accept.
#[derive(Debug, Clone, Copy)]
pub struct AuthenticateOptions {
    pub allow_public_key: bool,
    pub allow_jwt: bool,
}

impl Default for AuthenticateOptions {
    fn default() -> Self {
        Self {
            allow_public_key: true,
            allow_jwt: true,
        }
    }
}

/// Extra token kinds `AuthenticateRequest` accepts alongside API keys.
#[derive(Debug, Clone, Copy, Default)]
pub struct AuthenticateConfig {
    pub allow_personal_access_tokens: bool,
    pub allow_organization_access_tokens: bool,
}

/// Extract the bearer token from an `Authorization` header value.
/// Missing `Bearer ` prefix and empty-token are distinct failure kinds (§6).
fn extract_bearer_token(header_value: &str) -> Result<&str, AuthFailureKind> {
    let token = header_value
        .strip_prefix("Bearer ")
        .ok_or(AuthFailureKind::InvalidAuthorizationFormat)?;
    if token.is_empty() {
        return Err(AuthFailureKind::EmptyToken);
    }
    Ok(token)
}

pub struct AuthResolver<S: AuthStore> {
    store: S,
    signer: JwtSigner,
}

impl<S: AuthStore> AuthResolver<S> {
    pub fn new(store: S, jwt_secret: &str) -> Self {
        Self {
            store,
            signer: JwtSigner::new(jwt_secret),
        }
    }

    /// `AuthenticateAPIRequest(req, opts) → AuthenticationResult` (§4.1).
    pub async fn authenticate_api_request(
        &self,
        authorization_header: Option<&str>,
        opts: AuthenticateOptions,
    ) -> Result<AuthenticationResult, AuthError> {
        let header_value = match authorization_header {
            Some(v) => v,
            None => return Ok(AuthenticationResult::failure(AuthFailureKind::InvalidAuthorizationFormat)),
        };

        let token = match extract_bearer_token(header_value) {
            Ok(t) => t,
            Err(kind) => return Ok(AuthenticationResult::failure(kind)),
        };

        let category = match key_classifier::classify(token) {
            Ok(c) => c,
            Err(_) => return Ok(AuthenticationResult::failure(AuthFailureKind::InvalidKeyFormat)),
        };

        match category {
            KeyCategory::Public if !opts.allow_public_key => {
                Ok(AuthenticationResult::failure(AuthFailureKind::PublicNotAllowed))
            }
            KeyCategory::PublicJwt if !opts.allow_jwt => {
                Ok(AuthenticationResult::failure(AuthFailureKind::JwtNotAllowed))
            }
            KeyCategory::Public | KeyCategory::Private => {
                self.resolve_api_key(token, category).await
            }
            KeyCategory::PublicJwt => self.resolve_jwt(token).await,
        }
    }

    async fn resolve_api_key(
        &self,
        token: &str,
        category: KeyCategory,
    ) -> Result<AuthenticationResult, AuthError> {
        let environment = self
            .store
            .find_environment_by_api_key(token)
            .await
            .map_err(AuthError::Store)?;

        let Some(environment) = environment else {
            return Ok(AuthenticationResult::failure(AuthFailureKind::Unauthorized));
        };

        // Public keys resolve only non-production environments (§4.1).
        if category == KeyCategory::Public && environment.environment_type.is_production() {
            return Ok(AuthenticationResult::failure(AuthFailureKind::ForbiddenKeyType));
        }

        let token_kind = match category {
            KeyCategory::Public => TokenKind::ApiKeyPublic,
            KeyCategory::Private => TokenKind::ApiKeyPrivate,
            KeyCategory::PublicJwt => unreachable!("jwt handled separately"),
        };

        self.stamp_last_used(token_kind, token).await;

        Ok(AuthenticationResult::Success {
            environment,
            token_kind,
            scopes: vec![],
            otu: false,
            realtime: false,
        })
    }

    async fn resolve_jwt(&self, token: &str) -> Result<AuthenticationResult, AuthError> {
        let claims = match self.signer.verify(token) {
            Ok(c) => c,
            Err(_) => return Ok(AuthenticationResult::failure(AuthFailureKind::InvalidJwt)),
        };

        let environment_id = uuid::Uuid::parse_str(&claims.sub)
            .expect("verify() already validated sub is a UUID");

        let environment = self
            .store
            .find_environment_by_id(environment_id)
            .await
            .map_err(AuthError::Store)?;

        let Some(environment) = environment else {
            return Ok(AuthenticationResult::failure(AuthFailureKind::Unauthorized));
        };

        Ok(AuthenticationResult::Success {
            environment,
            token_kind: TokenKind::PublicJwt,
            scopes: claims.scopes.unwrap_or_default(),
            otu: claims.otu.unwrap_or(false),
            realtime: claims.realtime.unwrap_or(false),
        })
    }

    /// `AuthenticateRequest(req, config)` — additionally accepts PAT/OAT (§4.1).
    pub async fn authenticate_request(
        &self,
        authorization_header: Option<&str>,
        api_opts: AuthenticateOptions,
        config: AuthenticateConfig,
    ) -> Result<AuthenticationResult, AuthError> {
        let header_value = match authorization_header {
            Some(v) => v,
            None => return Ok(AuthenticationResult::failure(AuthFailureKind::InvalidAuthorizationFormat)),
        };
        let token = match extract_bearer_token(header_value) {
            Ok(t) => t,
            Err(kind) => return Ok(AuthenticationResult::failure(kind)),
        };

        if config.allow_personal_access_tokens {
            if let Some(environment) = self
                .store
                .find_environment_by_personal_access_token(token)
                .await
                .map_err(AuthError::Store)?
            {
                self.stamp_last_used(TokenKind::PersonalAccessToken, token).await;
                return Ok(AuthenticationResult::Success {
                    environment,
                    token_kind: TokenKind::PersonalAccessToken,
                    scopes: vec![],
                    otu: false,
                    realtime: false,
                });
            }
        }

        if config.allow_organization_access_tokens {
            if let Some(environment) = self
                .store
                .find_environment_by_organization_access_token(token)
                .await
                .map_err(AuthError::Store)?
            {
                self.stamp_last_used(TokenKind::OrganizationAccessToken, token).await;
                return Ok(AuthenticationResult::Success {
                    environment,
                    token_kind: TokenKind::OrganizationAccessToken,
                    scopes: vec![],
                    otu: false,
                    realtime: false,
                });
            }
        }

        self.authenticate_api_request(Some(header_value), api_opts).await
    }

    /// `GenerateJWTToken(env, payload, opts)` (§4.1).
    pub fn generate_jwt_token(
        &self,
        environment: &AuthenticatedEnvironment,
        payload: serde_json::Map<String, serde_json::Value>,
        opts: GenerateTokenOptions,
    ) -> Result<String, AuthError> {
        self.signer.generate(environment.environment_id, payload, opts)
    }

    /// Failure to stamp `last_used_at` does not fail authentication —
    /// logged and ignored (§4.1, §9: a deliberate availability tradeoff).
    async fn stamp_last_used(&self, kind: TokenKind, token: &str) {
        if let Err(err) = self.store.stamp_token_last_used(kind, token, Utc::now()).await {
            warn!(error = %err, ?kind, "failed to stamp last_used_at on token");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use uuid::Uuid;

    struct FakeStore {
        environment: Option<AuthenticatedEnvironment>,
        stamp_calls: Mutex<u32>,
    }

    fn sample_environment(env_type: EnvironmentType) -> AuthenticatedEnvironment {
        AuthenticatedEnvironment {
            environment_id: Uuid::new_v4(),
            organization_id: Uuid::new_v4(),
            project_id: Uuid::new_v4(),
            environment_slug: "prod".to_string(),
            api_key: "tr_live_ABCDEFGH".to_string(),
            environment_type: env_type,
            project_slug: "proj".to_string(),
            project_name: "Project".to_string(),
            org_slug: "org".to_string(),
            org_title: "Org".to_string(),
        }
    }

    #[async_trait]
    impl AuthStore for FakeStore {
        async fn find_environment_by_api_key(
            &self,
            _api_key: &str,
        ) -> Result<Option<AuthenticatedEnvironment>, String> {
            Ok(self.environment.clone())
        }

        async fn find_environment_by_id(
            &self,
            _environment_id: Uuid,
        ) -> Result<Option<AuthenticatedEnvironment>, String> {
            Ok(self.environment.clone())
        }

        async fn find_environment_by_personal_access_token(
            &self,
            _token: &str,
        ) -> Result<Option<AuthenticatedEnvironment>, String> {
            Ok(None)
        }

        async fn find_environment_by_organization_access_token(
            &self,
            _token: &str,
        ) -> Result<Option<AuthenticatedEnvironment>, String> {
            Ok(None)
        }

        async fn stamp_token_last_used(
            &self,
            _kind: TokenKind,
            _token: &str,
            _at: chrono::DateTime<Utc>,
        ) -> Result<(), String> {
            *self.stamp_calls.lock().unwrap() += 1;
            Ok(())
        }
    }

    #[tokio::test]
    async fn missing_bearer_prefix_is_invalid_authorization_format() {
        let store = FakeStore { environment: None, stamp_calls: Mutex::new(0) };
        let resolver = AuthResolver::new(store, "secret-at-least-16-bytes");
        let result = resolver
            .authenticate_api_request(Some("Token abc"), AuthenticateOptions::default())
            .await
            .unwrap();
        match result {
            AuthenticationResult::Failure { kind } => {
                assert_eq!(kind, AuthFailureKind::InvalidAuthorizationFormat)
            }
            _ => panic!("expected failure"),
        }
    }

    #[tokio::test]
    async fn empty_token_after_bearer_prefix_fails() {
        let store = FakeStore { environment: None, stamp_calls: Mutex::new(0) };
        let resolver = AuthResolver::new(store, "secret-at-least-16-bytes");
        let result = resolver
            .authenticate_api_request(Some("Bearer "), AuthenticateOptions::default())
            .await
            .unwrap();
        match result {
            AuthenticationResult::Failure { kind } => assert_eq!(kind, AuthFailureKind::EmptyToken),
            _ => panic!("expected failure"),
        }
    }

    #[tokio::test]
    async fn public_key_rejected_in_production_environment() {
        let store = FakeStore {
            environment: Some(sample_environment(EnvironmentType::Production)),
            stamp_calls: Mutex::new(0),
        };
        let resolver = AuthResolver::new(store, "secret-at-least-16-bytes");
        let result = resolver
            .authenticate_api_request(Some("Bearer pk_live_ABCDEFGH"), AuthenticateOptions::default())
            .await
            .unwrap();
        match result {
            AuthenticationResult::Failure { kind } => {
                assert_eq!(kind, AuthFailureKind::ForbiddenKeyType)
            }
            _ => panic!("expected failure"),
        }
    }

    #[tokio::test]
    async fn private_key_resolves_production_environment_and_stamps_last_used() {
        let store = FakeStore {
            environment: Some(sample_environment(EnvironmentType::Production)),
            stamp_calls: Mutex::new(0),
        };
        let resolver = AuthResolver::new(store, "secret-at-least-16-bytes");
        let result = resolver
            .authenticate_api_request(Some("Bearer tr_live_ABCDEFGH"), AuthenticateOptions::default())
            .await
            .unwrap();
        assert!(result.is_success());
    }

    #[tokio::test]
    async fn disallowed_public_key_fails_without_consulting_store() {
        let store = FakeStore { environment: None, stamp_calls: Mutex::new(0) };
        let resolver = AuthResolver::new(store, "secret-at-least-16-bytes");
        let opts = AuthenticateOptions { allow_public_key: false, allow_jwt: true };
        let result = resolver
            .authenticate_api_request(Some("Bearer pk_live_ABCDEFGH"), opts)
            .await
            .unwrap();
        match result {
            AuthenticationResult::Failure { kind } => {
                assert_eq!(kind, AuthFailureKind::PublicNotAllowed)
            }
            _ => panic!("expected failure"),
        }
    }
}
