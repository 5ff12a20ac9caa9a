use std::path::PathBuf;

/// Client configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the API server, without a trailing slash.
    pub api_url: String,
    /// Where [`FileTokenStore`](crate::token_store::FileTokenStore) keeps the token pair.
    pub token_file: PathBuf,
}

impl ClientConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                   |
    /// |------------------------|---------------------------|
    /// | `TASKBOARD_API_URL`    | `http://localhost:3000`   |
    /// | `TASKBOARD_TOKEN_FILE` | `.taskboard/tokens.json`  |
    pub fn from_env() -> Self {
        let api_url = std::env::var("TASKBOARD_API_URL")
            .unwrap_or_else(|_| "http://localhost:3000".into())
            .trim_end_matches('/')
            .to_string();

        let token_file = std::env::var("TASKBOARD_TOKEN_FILE")
            .unwrap_or_else(|_| ".taskboard/tokens.json".into())
            .into();

        Self {
            api_url,
            token_file,
        }
    }
}
