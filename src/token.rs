//! Where the GitHub credential comes from.
//!
//! The client never reaches for a global credential; a [`TokenStore`] is
//! handed to it at construction time instead.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// Key under which [`FileTokenStore`] keeps the token.
pub const TOKEN_KEY: &str = "github_token";

#[derive(Debug, Error)]
pub enum TokenStoreError {
    #[error("Token must not be empty")]
    EmptyToken,

    #[error("Token store is read-only: {0}")]
    ReadOnly(String),

    #[error("Failed to access token file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse token file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize token file: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// A get-or-none / set key-value slot holding the GitHub token.
#[async_trait]
pub trait TokenStore: Send + Sync {
    /// The stored token, or `None` when nothing usable is stored.
    async fn get(&self) -> Option<String>;

    async fn set(&self, token: &str) -> Result<(), TokenStoreError>;
}

/// Trim a raw token; blank means no token.
pub fn normalize_token(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Process-local store, mostly useful for tests and embedding.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    token: Mutex<Option<String>>,
}

impl MemoryTokenStore {
    pub fn with_token(token: &str) -> Self {
        Self {
            token: Mutex::new(normalize_token(token)),
        }
    }
}

#[async_trait]
impl TokenStore for MemoryTokenStore {
    async fn get(&self) -> Option<String> {
        self.token.lock().await.clone()
    }

    async fn set(&self, token: &str) -> Result<(), TokenStoreError> {
        let token = normalize_token(token).ok_or(TokenStoreError::EmptyToken)?;
        *self.token.lock().await = Some(token);
        Ok(())
    }
}

/// Reads the token from an environment variable. Cannot be written.
#[derive(Debug, Clone)]
pub struct EnvTokenStore {
    var: String,
}

impl EnvTokenStore {
    pub fn new(var: &str) -> Self {
        Self {
            var: var.to_string(),
        }
    }
}

impl Default for EnvTokenStore {
    fn default() -> Self {
        Self::new("GITHUB_TOKEN")
    }
}

#[async_trait]
impl TokenStore for EnvTokenStore {
    async fn get(&self) -> Option<String> {
        std::env::var(&self.var).ok().as_deref().and_then(normalize_token)
    }

    async fn set(&self, _token: &str) -> Result<(), TokenStoreError> {
        Err(TokenStoreError::ReadOnly(format!(
            "set the {} environment variable instead",
            self.var
        )))
    }
}

/// A TOML file with a single `github_token = "..."` entry.
///
/// Other keys in the file are preserved on write.
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

    async fn read_table(&self) -> Result<Option<toml::Table>, TokenStoreError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => Ok(Some(contents.parse::<toml::Table>()?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

#[async_trait]
impl TokenStore for FileTokenStore {
    async fn get(&self) -> Option<String> {
        match self.read_table().await {
            Ok(Some(table)) => table
                .get(TOKEN_KEY)
                .and_then(toml::Value::as_str)
                .and_then(normalize_token),
            Ok(None) => {
                debug!(path = %self.path.display(), "no token file");
                None
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "token file unreadable, continuing without token");
                None
            }
        }
    }

    async fn set(&self, token: &str) -> Result<(), TokenStoreError> {
        let token = normalize_token(token).ok_or(TokenStoreError::EmptyToken)?;
        let mut table = self.read_table().await?.unwrap_or_default();
        table.insert(TOKEN_KEY.to_string(), toml::Value::String(token));

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&self.path, toml::to_string(&table)?).await?;
        debug!(path = %self.path.display(), "saved token");
        Ok(())
    }
}
