pub mod content;
pub mod error;
pub mod pagination;
pub mod rate_limit;
pub mod request;
pub mod types;

pub use error::GitHubError;
pub use types::{ChangedFile, FileStatus, PullRequestMetadata, PullRequestScope, RepoCoordinates};

use std::time::Duration;

use tracing::{debug, instrument};

use crate::token::{normalize_token, TokenStore};

pub const DEFAULT_API_BASE_URL: &str = "https://api.github.com";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(20);
/// Page size for the changed-files listing; GitHub's practical maximum.
pub const FILES_PER_PAGE: usize = 100;

const USER_AGENT: &str = concat!("pr-snapshot/", env!("CARGO_PKG_VERSION"));

/// Settings fixed for the lifetime of one client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientOptions {
    pub api_base_url: String,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Upper bound on files resolved at once. `None` resolves every file
    /// concurrently.
    pub max_concurrent_files: Option<usize>,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            max_concurrent_files: None,
        }
    }
}

/// Aggregation client scoped to a single pull request.
///
/// The credential is read once at construction and shared, read-only, by
/// every request the client issues.
pub struct GitHubClient {
    http: reqwest::Client,
    scope: PullRequestScope,
    token: Option<String>,
    base_url: String,
    timeout: Duration,
    max_concurrent_files: Option<usize>,
}

impl std::fmt::Debug for GitHubClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubClient")
            .field("scope", &self.scope)
            .field("authenticated", &self.token.is_some())
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl GitHubClient {
    pub fn new(
        scope: PullRequestScope,
        token: Option<String>,
        options: ClientOptions,
    ) -> Result<Self, GitHubError> {
        let base_url = options.api_base_url.trim_end_matches('/').to_string();
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| GitHubError::RequestFailed {
                url: base_url.clone(),
                status: None,
                message: format!("failed to build HTTP client: {e}"),
                body: None,
            })?;

        Ok(Self {
            http,
            scope,
            token: token.as_deref().and_then(normalize_token),
            base_url,
            timeout: options.timeout,
            max_concurrent_files: options.max_concurrent_files.filter(|limit| *limit > 0),
        })
    }

    /// Build a client for the PR at `url` (https://github.com/{owner}/{repo}/pull/{n}).
    pub fn from_pr_url(
        url: &str,
        token: Option<String>,
        options: ClientOptions,
    ) -> Result<Self, GitHubError> {
        let scope = PullRequestScope::from_pr_url(url)?;
        Self::new(scope, token, options)
    }

    /// Build a client whose credential comes from `store`. A store with no
    /// token yields an anonymous client.
    #[instrument(skip(store, options), fields(owner = %scope.repo().owner(), repo = %scope.repo().name(), pr = scope.number()))]
    pub async fn from_token_store(
        scope: PullRequestScope,
        store: &dyn TokenStore,
        options: ClientOptions,
    ) -> Result<Self, GitHubError> {
        let token = store.get().await;
        debug!(authenticated = token.is_some(), "resolved credential from token store");
        Self::new(scope, token, options)
    }

    pub fn scope(&self) -> &PullRequestScope {
        &self.scope
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    pub(crate) fn max_concurrent_files(&self) -> Option<usize> {
        self.max_concurrent_files
    }

    /// Single request for the pull request's metadata.
    pub async fn get_pull_request_metadata(&self) -> Result<PullRequestMetadata, GitHubError> {
        self.get_json(&self.scope.pull_path()).await
    }

    /// Every changed file of the pull request, in GitHub's order.
    pub async fn get_changed_files(&self) -> Result<Vec<ChangedFile>, GitHubError> {
        self.get_all_pages(&self.scope.files_path(), FILES_PER_PAGE)
            .await
    }
}
