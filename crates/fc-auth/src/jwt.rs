//! HS256 JWT signing and verification (§4.1, §6).
//!
//! The source supports RS256 for production principals; this pipeline's
//! `PUBLIC_JWT` category is HS256-only, signed and verified with the
//! same process secret.

use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::error::AuthError;

/// Claims carried by an environment-scoped JWT. `sub` is the environment
/// id; everything else is free-form, merged from the caller's payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnvironmentClaims {
    pub sub: String,
    pub exp: i64,
    pub iat: i64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scopes: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub otu: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub realtime: Option<bool>,

    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

/// Either a relative duration (seconds from now) or an absolute unix
/// timestamp, per `GenerateJWTToken`'s `opts.ExpirationTime`.
#[derive(Debug, Clone, Copy)]
pub enum Expiration {
    AfterSeconds(i64),
    AbsoluteUnix(i64),
}

#[derive(Debug, Clone, Default)]
pub struct GenerateTokenOptions {
    pub custom_claims: serde_json::Map<String, Value>,
    pub expiration: Option<Expiration>,
}

pub struct JwtSigner {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl JwtSigner {
    pub fn new(secret: &str) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    /// HMAC-sign a JWT with `sub = environment.id`, merging `payload`
    /// into claims and honoring `opts.expiration`.
    pub fn generate(
        &self,
        environment_id: Uuid,
        payload: serde_json::Map<String, Value>,
        opts: GenerateTokenOptions,
    ) -> Result<String, AuthError> {
        let now = Utc::now().timestamp();
        let exp = match opts.expiration {
            Some(Expiration::AfterSeconds(secs)) => now + secs,
            Some(Expiration::AbsoluteUnix(ts)) => ts,
            None => now + 3600,
        };

        let mut extra = payload;
        for (k, v) in opts.custom_claims {
            extra.insert(k, v);
        }

        let scopes = extra
            .remove("scopes")
            .and_then(|v| serde_json::from_value(v).ok());
        let otu = extra.remove("otu").and_then(|v| v.as_bool());
        let realtime = extra.remove("realtime").and_then(|v| v.as_bool());

        let claims = EnvironmentClaims {
            sub: environment_id.to_string(),
            exp,
            iat: now,
            scopes,
            otu,
            realtime,
            extra,
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AuthError::SigningFailed(e.to_string()))
    }

    /// Verify a PUBLIC_JWT. HS256 only; a signing-method mismatch fails
    /// with `unexpected signing method` per §6. `sub` must parse as a UUID.
    pub fn verify(&self, token: &str) -> Result<EnvironmentClaims, String> {
        let header = jsonwebtoken::decode_header(token).map_err(|e| e.to_string())?;
        if header.alg != jsonwebtoken::Algorithm::HS256 {
            return Err("unexpected signing method".to_string());
        }

        let validation = Validation::new(jsonwebtoken::Algorithm::HS256);
        let data = decode::<EnvironmentClaims>(token, &self.decoding_key, &validation)
            .map_err(|e| e.to_string())?;

        Uuid::parse_str(&data.claims.sub).map_err(|_| "sub is not a UUID".to_string())?;

        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_generate_and_verify() {
        let signer = JwtSigner::new("test-secret-at-least-16-bytes");
        let env_id = Uuid::new_v4();
        let token = signer
            .generate(env_id, serde_json::Map::new(), GenerateTokenOptions::default())
            .unwrap();

        let claims = signer.verify(&token).unwrap();
        assert_eq!(claims.sub, env_id.to_string());
    }

    #[test]
    fn rejects_token_signed_with_different_secret() {
        let signer_a = JwtSigner::new("secret-a-0123456789");
        let signer_b = JwtSigner::new("secret-b-0123456789");
        let token = signer_a
            .generate(Uuid::new_v4(), serde_json::Map::new(), GenerateTokenOptions::default())
            .unwrap();

        assert!(signer_b.verify(&token).is_err());
    }

    #[test]
    fn expiration_after_seconds_is_relative_to_now() {
        let signer = JwtSigner::new("test-secret-at-least-16-bytes");
        let before = Utc::now().timestamp();
        let token = signer
            .generate(
                Uuid::new_v4(),
                serde_json::Map::new(),
                GenerateTokenOptions {
                    custom_claims: serde_json::Map::new(),
                    expiration: Some(Expiration::AfterSeconds(60)),
                },
            )
            .unwrap();
        let claims = signer.verify(&token).unwrap();
        assert!(claims.exp >= before + 60);
    }
}
