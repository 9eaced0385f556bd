//! Auth error taxonomy.
//!
//! Shape errors (malformed header, disallowed key category, expired JWT)
//! are surfaced to the caller as a failed [`crate::AuthenticationResult`]
//! rather than an `Err` — only store/IO failures propagate as [`AuthError`].

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("store error: {0}")]
    Store(String),

    #[error("jwt signing failed: {0}")]
    SigningFailed(String),
}

/// Machine-readable classification of why authentication failed.
///
/// Mirrors the error kinds a request-handling layer maps to HTTP 401.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuthFailureKind {
    InvalidAuthorizationFormat,
    EmptyToken,
    InvalidKeyFormat,
    PublicNotAllowed,
    JwtNotAllowed,
    InvalidJwt,
    Unauthorized,
    ForbiddenKeyType,
}

impl AuthFailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidAuthorizationFormat => "invalid_authorization_format",
            Self::EmptyToken => "empty_token",
            Self::InvalidKeyFormat => "invalid_key_format",
            Self::PublicNotAllowed => "public_not_allowed",
            Self::JwtNotAllowed => "jwt_not_allowed",
            Self::InvalidJwt => "invalid_jwt",
            Self::Unauthorized => "unauthorized",
            Self::ForbiddenKeyType => "forbidden_key_type",
        }
    }
}

impl std::fmt::Display for AuthFailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
