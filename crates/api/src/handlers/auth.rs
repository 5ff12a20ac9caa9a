//! Handlers for the `/auth` resource (login, refresh, logout).

use axum::extract::State;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use taskboard_core::error::CoreError;
use taskboard_core::types::DbId;
use taskboard_db::models::session::CreateSession;
use taskboard_db::models::user::UserInfo;

use crate::auth::jwt::{issue_tokens, verify_refresh_token, IssuedTokens, RefreshTokenError};
use crate::auth::password::verify_password;
use crate::error::{AppError, AppResult};
use crate::extract::JsonBody;
use crate::response::ApiResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /api/auth/login`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Request body for `POST /api/auth/refresh` and `POST /api/auth/logout`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    #[serde(default)]
    pub refresh_token: Option<String>,
}

impl RefreshRequest {
    fn require_token(self) -> AppResult<String> {
        self.refresh_token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| AppError::BadRequest("Необходимо указать refreshToken".into()))
    }
}

/// Token pair returned by refresh.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPairResponse {
    pub access_token: String,
    pub refresh_token: String,
}

/// Response of a successful login.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub user: UserInfo,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/auth/login
///
/// Authenticate with email + password and open a new session.
pub async fn login(
    State(state): State<AppState>,
    JsonBody(input): JsonBody<LoginRequest>,
) -> AppResult<ApiResponse<LoginResponse>> {
    let user = state
        .store
        .find_user_by_email(&input.email)
        .await?
        .ok_or_else(|| AppError::not_found("Пользователь не найден"))?;

    let password_valid = verify_password(&input.password, &user.password_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;

    if !password_valid {
        tracing::debug!(user_id = user.id, "Login rejected: wrong password");
        return Err(AppError::Core(CoreError::Validation(
            "Неверный логин или пароль".into(),
        )));
    }

    let tokens = mint(&state, user.id, &user.email)?;
    state
        .store
        .create_session(&CreateSession {
            user_id: user.id,
            refresh_token: tokens.refresh_token.clone(),
            expires_at: tokens.session_expires_at,
        })
        .await?;

    tracing::info!(user_id = user.id, "User logged in");

    Ok(ApiResponse::ok(LoginResponse {
        access_token: tokens.access_token,
        refresh_token: tokens.refresh_token,
        user: UserInfo::from(&user),
    }))
}

/// POST /api/auth/refresh
///
/// Exchange a refresh token for a new pair. The presented token's session is
/// consumed on every outcome except a store failure.
pub async fn refresh(
    State(state): State<AppState>,
    JsonBody(input): JsonBody<RefreshRequest>,
) -> AppResult<ApiResponse<TokenPairResponse>> {
    let presented = input.require_token()?;

    let user_id = verify_refresh_token(&presented, &state.config.jwt).map_err(|e| {
        tracing::debug!(error = %e, "Refresh token failed verification");
        match e {
            RefreshTokenError::Invalid(_) => AppError::BadRequest("Невалидный refreshToken".into()),
            RefreshTokenError::MalformedPayload => AppError::BadRequest("Невалидный payload".into()),
        }
    })?;

    let session = state
        .store
        .find_session(&presented, user_id)
        .await?
        .ok_or_else(|| AppError::not_found("Сессия не найдена"))?;

    if session.is_expired(Utc::now()) {
        state.store.delete_session(session.id).await?;
        tracing::debug!(user_id, session_id = session.id, "Refresh rejected: session expired");
        return Err(AppError::BadRequest("Сессия истекла".into()));
    }

    let user = state
        .store
        .find_user_by_id(user_id)
        .await?
        .ok_or_else(|| AppError::not_found("Пользователь не найден"))?;

    let tokens = mint(&state, user.id, &user.email)?;
    let replacement = CreateSession {
        user_id: user.id,
        refresh_token: tokens.refresh_token.clone(),
        expires_at: tokens.session_expires_at,
    };

    // None: a concurrent request consumed the same session first.
    state
        .store
        .rotate_session(session.id, &replacement)
        .await?
        .ok_or_else(|| AppError::not_found("Сессия не найдена"))?;

    tracing::debug!(user_id, consumed = session.id, "Session rotated");

    Ok(ApiResponse::ok(TokenPairResponse {
        access_token: tokens.access_token,
        refresh_token: tokens.refresh_token,
    }))
}

/// POST /api/auth/logout
///
/// Delete the session bound to the given refresh token, if any.
pub async fn logout(
    State(state): State<AppState>,
    JsonBody(input): JsonBody<RefreshRequest>,
) -> AppResult<ApiResponse<()>> {
    let token = input.require_token()?;
    let removed = state.store.delete_session_by_token(&token).await?;
    tracing::debug!(removed, "Logout");
    Ok(ApiResponse::empty())
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn mint(state: &AppState, user_id: DbId, email: &str) -> AppResult<IssuedTokens> {
    issue_tokens(user_id, email, &state.config.jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))
}
