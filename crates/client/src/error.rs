use reqwest::StatusCode;

/// Errors returned by client operations.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Transport failure (connection refused, DNS, timeout). Never retried.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The server answered with a non-2xx status.
    #[error("{message} ({status})")]
    Api { status: StatusCode, message: String },

    /// A 401 could not be recovered by refreshing; the user must log in again.
    #[error("Необходима повторная авторизация")]
    ReauthRequired,

    /// Input rejected before any request was made.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// A successful response did not have the expected shape.
    #[error("Unexpected response: {0}")]
    Decode(String),

    /// Reading or writing persisted tokens failed.
    #[error("Token storage error: {0}")]
    Storage(String),
}

impl ClientError {
    /// HTTP status for [`ClientError::Api`], `None` otherwise.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}
