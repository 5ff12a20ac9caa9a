//! Bearer-token verification and the [`AuthUser`] extractor.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use taskboard_core::types::DbId;

use crate::auth::jwt::validate_access_token;
use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Message of the 401 returned to unauthenticated callers.
pub const AUTH_REQUIRED_MESSAGE: &str = "Требуется авторизация";

/// Identity decoded from a verified access token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenPayload {
    pub user_id: DbId,
    pub email: String,
}

/// Resolve the caller from the `Authorization` header.
///
/// Returns `Ok(None)` when the header is missing, is not a Bearer token,
/// fails signature or expiry checks, or names a user that no longer exists.
/// Only a store failure while checking the user is an error.
pub async fn user_from_headers(
    headers: &HeaderMap,
    state: &AppState,
) -> AppResult<Option<TokenPayload>> {
    let Some(token) = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
    else {
        return Ok(None);
    };

    let claims = match validate_access_token(token, &state.config.jwt) {
        Ok(claims) => claims,
        Err(e) => {
            tracing::debug!(error = %e, "Rejected access token");
            return Ok(None);
        }
    };

    if state.store.find_user_by_id(claims.user_id).await?.is_none() {
        tracing::debug!(user_id = claims.user_id, "Access token names a missing user");
        return Ok(None);
    }

    Ok(Some(TokenPayload {
        user_id: claims.user_id,
        email: claims.email,
    }))
}

/// Authenticated user, required by every protected handler.
///
/// ```ignore
/// async fn my_handler(user: AuthUser) -> AppResult<ApiResponse<()>> {
///     tracing::info!(user_id = user.user_id, "handling request");
///     Ok(ApiResponse::empty())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: DbId,
    pub email: String,
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let payload = user_from_headers(&parts.headers, state)
            .await?
            .ok_or_else(|| AppError::unauthorized(AUTH_REQUIRED_MESSAGE))?;

        Ok(AuthUser {
            user_id: payload.user_id,
            email: payload.email,
        })
    }
}
