//! Persistence of the client's access/refresh token pair.
//!
//! The store is the only source of truth for "is someone logged in". Reads
//! happen fresh at every call site so a refresh performed by one caller is
//! immediately visible to the next.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use crate::error::ClientError;
use crate::models::TokenPair;

/// Injectable storage for the token pair.
pub trait TokenStore: Send + Sync {
    fn access_token(&self) -> Option<String>;

    fn refresh_token(&self) -> Option<String>;

    /// Overwrite both tokens.
    fn set(&self, pair: &TokenPair) -> Result<(), ClientError>;

    /// Remove both tokens. Clearing an empty store is not an error.
    fn clear(&self) -> Result<(), ClientError>;
}

/// Token store that lives only as long as the process.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    pair: Mutex<Option<TokenPair>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tokens(pair: TokenPair) -> Self {
        Self {
            pair: Mutex::new(Some(pair)),
        }
    }

    fn read(&self) -> Option<TokenPair> {
        self.pair.lock().ok().and_then(|p| p.clone())
    }
}

impl TokenStore for MemoryTokenStore {
    fn access_token(&self) -> Option<String> {
        self.read().map(|p| p.access_token)
    }

    fn refresh_token(&self) -> Option<String> {
        self.read().map(|p| p.refresh_token)
    }

    fn set(&self, pair: &TokenPair) -> Result<(), ClientError> {
        let mut guard = self
            .pair
            .lock()
            .map_err(|e| ClientError::Storage(e.to_string()))?;
        *guard = Some(pair.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), ClientError> {
        let mut guard = self
            .pair
            .lock()
            .map_err(|e| ClientError::Storage(e.to_string()))?;
        *guard = None;
        Ok(())
    }
}

/// On-disk layout, one key per token.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TokenFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    access_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    refresh_token: Option<String>,
}

/// Token store backed by a JSON file with keys `accessToken` and
/// `refreshToken`.
///
/// A missing or unreadable file reads as "no tokens".
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> TokenFile {
        match std::fs::read(&self.path) {
            Ok(bytes) => serde_json::from_slice(&bytes).unwrap_or_else(|e| {
                tracing::warn!(path = %self.path.display(), error = %e, "Ignoring corrupt token file");
                TokenFile::default()
            }),
            Err(_) => TokenFile::default(),
        }
    }
}

impl TokenStore for FileTokenStore {
    fn access_token(&self) -> Option<String> {
        self.load().access_token
    }

    fn refresh_token(&self) -> Option<String> {
        self.load().refresh_token
    }

    fn set(&self, pair: &TokenPair) -> Result<(), ClientError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| ClientError::Storage(e.to_string()))?;
        }
        let file = TokenFile {
            access_token: Some(pair.access_token.clone()),
            refresh_token: Some(pair.refresh_token.clone()),
        };
        let bytes =
            serde_json::to_vec_pretty(&file).map_err(|e| ClientError::Storage(e.to_string()))?;
        std::fs::write(&self.path, bytes).map_err(|e| ClientError::Storage(e.to_string()))
    }

    fn clear(&self) -> Result<(), ClientError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(ClientError::Storage(e.to_string())),
        }
    }
}
