//! Access- and refresh-token minting and verification.
//!
//! Both tokens are HS256-signed JWTs, each with its own secret. Access tokens
//! carry [`AccessClaims`] (`userId`, `email`); refresh tokens carry only
//! `userId` so they cannot double as access credentials.

use std::collections::HashMap;

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use taskboard_core::types::{DbId, Timestamp};
use uuid::Uuid;

/// Default access token expiry in minutes.
const DEFAULT_ACCESS_EXPIRY_MINS: i64 = 15;
/// Default refresh token expiry in days.
const DEFAULT_REFRESH_EXPIRY_DAYS: i64 = 7;

/// Claims embedded in every access token.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AccessClaims {
    #[serde(rename = "userId")]
    pub user_id: DbId,
    pub email: String,
    /// Expiration time (UTC Unix timestamp).
    pub exp: i64,
    /// Issued-at time (UTC Unix timestamp).
    pub iat: i64,
    /// Unique token identifier, keeps tokens minted in the same second distinct.
    pub jti: String,
}

#[derive(Debug, Serialize)]
struct RefreshClaims {
    #[serde(rename = "userId")]
    user_id: DbId,
    exp: i64,
    iat: i64,
    jti: String,
}

/// Configuration for token generation and validation.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// HMAC-SHA256 secret for access tokens.
    pub access_secret: String,
    /// HMAC-SHA256 secret for refresh tokens. Must differ from `access_secret`.
    pub refresh_secret: String,
    /// Access token lifetime in minutes (default: 15).
    pub access_token_expiry_mins: i64,
    /// Refresh token and session lifetime in days (default: 7).
    pub refresh_token_expiry_days: i64,
}

impl JwtConfig {
    /// Load JWT configuration from environment variables.
    ///
    /// | Env Var                     | Required | Default |
    /// |-----------------------------|----------|---------|
    /// | `ACCESS_TOKEN_SECRET`       | **yes**  | --      |
    /// | `REFRESH_TOKEN_SECRET`      | **yes**  | --      |
    /// | `ACCESS_TOKEN_EXPIRY_MINS`  | no       | `15`    |
    /// | `REFRESH_TOKEN_EXPIRY_DAYS` | no       | `7`     |
    ///
    /// # Panics
    ///
    /// Panics if either secret is missing or empty, or if both are equal.
    pub fn from_env() -> Self {
        let access_secret = std::env::var("ACCESS_TOKEN_SECRET")
            .expect("ACCESS_TOKEN_SECRET must be set in the environment");
        let refresh_secret = std::env::var("REFRESH_TOKEN_SECRET")
            .expect("REFRESH_TOKEN_SECRET must be set in the environment");
        assert!(!access_secret.is_empty(), "ACCESS_TOKEN_SECRET must not be empty");
        assert!(!refresh_secret.is_empty(), "REFRESH_TOKEN_SECRET must not be empty");
        assert_ne!(
            access_secret, refresh_secret,
            "ACCESS_TOKEN_SECRET and REFRESH_TOKEN_SECRET must differ"
        );

        let access_token_expiry_mins: i64 = std::env::var("ACCESS_TOKEN_EXPIRY_MINS")
            .unwrap_or_else(|_| DEFAULT_ACCESS_EXPIRY_MINS.to_string())
            .parse()
            .expect("ACCESS_TOKEN_EXPIRY_MINS must be a valid i64");

        let refresh_token_expiry_days: i64 = std::env::var("REFRESH_TOKEN_EXPIRY_DAYS")
            .unwrap_or_else(|_| DEFAULT_REFRESH_EXPIRY_DAYS.to_string())
            .parse()
            .expect("REFRESH_TOKEN_EXPIRY_DAYS must be a valid i64");

        Self {
            access_secret,
            refresh_secret,
            access_token_expiry_mins,
            refresh_token_expiry_days,
        }
    }

    /// Absolute expiry for a session created at `now`.
    pub fn session_expiry(&self, now: Timestamp) -> Timestamp {
        now + Duration::days(self.refresh_token_expiry_days)
    }
}

/// A freshly minted access/refresh pair.
#[derive(Debug, Clone)]
pub struct IssuedTokens {
    pub access_token: String,
    pub refresh_token: String,
    /// Absolute expiry to persist on the session row.
    pub session_expires_at: Timestamp,
}

/// Why a refresh token was rejected.
#[derive(Debug, thiserror::Error)]
pub enum RefreshTokenError {
    /// Bad signature, expired, or not a JWT at all.
    #[error("invalid refresh token: {0}")]
    Invalid(#[from] jsonwebtoken::errors::Error),
    /// Signature is fine but there is no numeric `userId` claim.
    #[error("refresh token payload has no numeric userId")]
    MalformedPayload,
}

/// Mint an access token for the given user.
pub fn generate_access_token(
    user_id: DbId,
    email: &str,
    config: &JwtConfig,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = Utc::now().timestamp();
    let claims = AccessClaims {
        user_id,
        email: email.to_string(),
        exp: now + config.access_token_expiry_mins * 60,
        iat: now,
        jti: Uuid::new_v4().to_string(),
    };

    encode(
        &Header::default(), // HS256
        &claims,
        &EncodingKey::from_secret(config.access_secret.as_bytes()),
    )
}

/// Mint a refresh token for the given user.
pub fn generate_refresh_token(
    user_id: DbId,
    config: &JwtConfig,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = Utc::now().timestamp();
    let claims = RefreshClaims {
        user_id,
        exp: now + config.refresh_token_expiry_days * 24 * 60 * 60,
        iat: now,
        jti: Uuid::new_v4().to_string(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.refresh_secret.as_bytes()),
    )
}

/// Mint both tokens and compute the session expiry.
pub fn issue_tokens(
    user_id: DbId,
    email: &str,
    config: &JwtConfig,
) -> Result<IssuedTokens, jsonwebtoken::errors::Error> {
    Ok(IssuedTokens {
        access_token: generate_access_token(user_id, email, config)?,
        refresh_token: generate_refresh_token(user_id, config)?,
        session_expires_at: config.session_expiry(Utc::now()),
    })
}

/// Validate and decode an access token, returning the embedded [`AccessClaims`].
///
/// Validates the signature and expiration.
pub fn validate_access_token(
    token: &str,
    config: &JwtConfig,
) -> Result<AccessClaims, jsonwebtoken::errors::Error> {
    let token_data = decode::<AccessClaims>(
        token,
        &DecodingKey::from_secret(config.access_secret.as_bytes()),
        &Validation::default(),
    )?;
    Ok(token_data.claims)
}

/// Verify a refresh token against the refresh secret and return its `userId`.
pub fn verify_refresh_token(token: &str, config: &JwtConfig) -> Result<DbId, RefreshTokenError> {
    let token_data = decode::<HashMap<String, serde_json::Value>>(
        token,
        &DecodingKey::from_secret(config.refresh_secret.as_bytes()),
        &Validation::default(),
    )?;

    token_data
        .claims
        .get("userId")
        .and_then(serde_json::Value::as_i64)
        .ok_or(RefreshTokenError::MalformedPayload)
}
