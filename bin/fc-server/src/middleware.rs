//! `RequireAPIKey` / `RequireAuth` guard extractors (§6), modeled on the
//! teacher's `Authenticated` / `AuthError` `FromRequestParts` pair in
//! `fc-platform::shared::middleware`, adapted to carry `fc_auth`'s
//! `AuthenticationResult` instead of a JWT-only session.

use axum::extract::FromRequestParts;
use axum::http::{header::AUTHORIZATION, request::Parts, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use fc_auth::{
    AuthenticateConfig, AuthenticateOptions, AuthenticatedEnvironment, AuthenticationResult,
    TokenKind,
};
use serde::Serialize;

use crate::state::AppState;

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

pub struct AuthRejection {
    status: StatusCode,
    message: String,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        (self.status, Json(ErrorBody { error: self.message })).into_response()
    }
}

fn infra_error() -> AuthRejection {
    AuthRejection {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        message: "auth service unavailable".to_string(),
    }
}

fn unauthorized(kind: impl std::fmt::Display) -> AuthRejection {
    AuthRejection {
        status: StatusCode::UNAUTHORIZED,
        message: kind.to_string(),
    }
}

/// Resolved principal an authenticated handler can depend on.
#[derive(Debug, Clone)]
pub struct AuthenticatedRequest {
    pub environment: AuthenticatedEnvironment,
    pub token_kind: TokenKind,
}

/// `RequireAPIKey`: API keys and PUBLIC_JWT only (§6).
pub struct RequireApiKey(pub AuthenticatedRequest);

impl<S> FromRequestParts<S> for RequireApiKey
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let app_state = parts
            .extensions
            .get::<AppState>()
            .ok_or_else(infra_error)?
            .clone();

        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok());

        let result = app_state
            .auth
            .authenticate_api_request(header, AuthenticateOptions::default())
            .await
            .map_err(|_| infra_error())?;

        match result {
            AuthenticationResult::Success { environment, token_kind, .. } => {
                Ok(RequireApiKey(AuthenticatedRequest { environment, token_kind }))
            }
            AuthenticationResult::Failure { kind } => Err(unauthorized(kind)),
        }
    }
}

/// `RequireAuth`: additionally accepts PAT/OAT per the deployment's
/// `AuthenticateConfig` (§6).
pub struct RequireAuth(pub AuthenticatedRequest);

impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let app_state = parts
            .extensions
            .get::<AppState>()
            .ok_or_else(infra_error)?
            .clone();

        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok());

        let config = AuthenticateConfig {
            allow_personal_access_tokens: true,
            allow_organization_access_tokens: true,
        };

        let result = app_state
            .auth
            .authenticate_request(header, AuthenticateOptions::default(), config)
            .await
            .map_err(|_| infra_error())?;

        match result {
            AuthenticationResult::Success { environment, token_kind, .. } => {
                Ok(RequireAuth(AuthenticatedRequest { environment, token_kind }))
            }
            AuthenticationResult::Failure { kind } => Err(unauthorized(kind)),
        }
    }
}

/// Injects [`AppState`] into request extensions so the extractors above
/// can reach it without threading it through every handler signature —
/// same shape as the teacher's `AuthLayer`.
#[derive(Clone)]
pub struct StateLayer {
    state: AppState,
}

impl StateLayer {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }
}

impl<S> tower::Layer<S> for StateLayer {
    type Service = StateMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        StateMiddleware { inner, state: self.state.clone() }
    }
}

#[derive(Clone)]
pub struct StateMiddleware<S> {
    inner: S,
    state: AppState,
}

impl<S, B> tower::Service<axum::http::Request<B>> for StateMiddleware<S>
where
    S: tower::Service<axum::http::Request<B>, Response = Response> + Send + Clone + 'static,
    S::Future: Send + 'static,
    B: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = std::pin::Pin<Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut std::task::Context<'_>) -> std::task::Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: axum::http::Request<B>) -> Self::Future {
        req.extensions_mut().insert(self.state.clone());
        let future = self.inner.call(req);
        Box::pin(async move { future.await })
    }
}
