use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

use crate::github::{ClientOptions, DEFAULT_API_BASE_URL, DEFAULT_TIMEOUT};
use crate::token::{normalize_token, EnvTokenStore, FileTokenStore, TokenStore};

pub const CONFIG_FILE: &str = ".pr-snapshot.toml";
pub const DEFAULT_TOKEN_FILE: &str = ".pr-snapshot-token.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Top-level configuration loaded from .pr-snapshot.toml.
/// All fields are optional; the tool works with zero config.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub github: GitHubConfig,

    #[serde(default)]
    pub snapshot: SnapshotConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GitHubConfig {
    /// GitHub API token. Takes precedence over GITHUB_TOKEN and the token file.
    pub token: Option<String>,
    pub api_base_url: Option<String>,
    pub timeout_secs: Option<u64>,
    /// Where `--save-token` persists the token.
    pub token_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SnapshotConfig {
    /// Files resolved at once; 0 resolves them all concurrently.
    #[serde(default)]
    pub max_concurrent_files: usize,
}

impl Config {
    /// Load configuration from .pr-snapshot.toml in the current directory.
    /// Returns default config if the file doesn't exist.
    pub fn load() -> Result<Config, ConfigError> {
        let path = Path::new(CONFIG_FILE);
        if path.exists() {
            debug!(path = %path.display(), "loading config file");
            Self::load_from(path)
        } else {
            Ok(Config::default())
        }
    }

    /// Load from a specific path.
    pub fn load_from(path: &Path) -> Result<Config, ConfigError> {
        let contents = fs::read_to_string(path)?;
        let config = toml::from_str(&contents)?;
        Ok(config)
    }

    pub fn token_store(&self) -> FileTokenStore {
        FileTokenStore::new(
            self.github
                .token_file
                .clone()
                .unwrap_or_else(|| PathBuf::from(DEFAULT_TOKEN_FILE)),
        )
    }

    /// Resolve the GitHub token: config file value first, then the
    /// GITHUB_TOKEN env var, then the token file.
    pub async fn resolve_token(&self) -> Option<String> {
        if let Some(token) = self.github.token.as_deref().and_then(normalize_token) {
            return Some(token);
        }
        if let Some(token) = EnvTokenStore::default().get().await {
            return Some(token);
        }
        self.token_store().get().await
    }

    pub fn client_options(&self) -> ClientOptions {
        ClientOptions {
            api_base_url: self
                .github
                .api_base_url
                .clone()
                .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string()),
            timeout: self
                .github
                .timeout_secs
                .map(Duration::from_secs)
                .unwrap_or(DEFAULT_TIMEOUT),
            max_concurrent_files: Some(self.snapshot.max_concurrent_files).filter(|n| *n > 0),
        }
    }
}
