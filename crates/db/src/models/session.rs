//! Refresh-token session model and DTOs.

use sqlx::FromRow;
use taskboard_core::types::{DbId, Timestamp};

/// A row from the `sessions` table.
///
/// Each row binds exactly one refresh token to a user. The row is deleted the
/// first time its token is presented for refresh.
#[derive(Debug, Clone, FromRow)]
pub struct Session {
    pub id: DbId,
    pub user_id: DbId,
    pub refresh_token: String,
    pub expires_at: Timestamp,
    pub created_at: Timestamp,
}

impl Session {
    /// Whether the absolute expiry has passed at `now`.
    pub fn is_expired(&self, now: Timestamp) -> bool {
        now > self.expires_at
    }
}

/// DTO for creating a new session.
#[derive(Debug, Clone)]
pub struct CreateSession {
    pub user_id: DbId,
    pub refresh_token: String,
    pub expires_at: Timestamp,
}
