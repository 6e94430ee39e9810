use std::time::{Duration, SystemTime, UNIX_EPOCH};

use thiserror::Error;

/// Every way a snapshot fetch can fail.
///
/// Callers branch on the variant: prompt for a new token on
/// `AuthenticationFailed`, show a retry hint on `RateLimited`, and so on.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GitHubError {
    #[error("GitHub API request timed out after {}s: {url}", timeout.as_secs())]
    RequestTimeout { url: String, timeout: Duration },

    #[error("GitHub API request failed{}: {message}", status.map(|s| format!(" with status {s}")).unwrap_or_default())]
    RequestFailed {
        url: String,
        /// HTTP status, absent for transport-level failures.
        status: Option<u16>,
        message: String,
        /// Response body text kept for diagnostics.
        body: Option<String>,
    },

    #[error("GitHub authentication failed or token lacks scope (status {status})")]
    AuthenticationFailed {
        url: String,
        status: u16,
        body: String,
    },

    #[error("{} (status {status})", if *secondary { "GitHub API secondary rate limit hit" } else { "GitHub API rate limit exceeded" })]
    RateLimited {
        url: String,
        status: u16,
        /// Unix epoch seconds from `x-ratelimit-reset`, when GitHub sent it.
        reset_at: Option<u64>,
        /// True for the 429 "secondary" limit, false for quota exhaustion.
        secondary: bool,
    },

    #[error("Failed to decode content of {path}: {reason}")]
    ContentDecodeFailed { path: String, reason: String },

    #[error("Pagination safety limit of {max_pages} pages reached for {path}")]
    PaginationLimitExceeded { path: String, max_pages: u32 },

    #[error("Invalid repository coordinates: {0}")]
    InvalidCoordinates(String),
}

impl GitHubError {
    /// HTTP status attached to the failure, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            GitHubError::RequestFailed { status, .. } => *status,
            GitHubError::AuthenticationFailed { status, .. }
            | GitHubError::RateLimited { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, GitHubError::RequestFailed { status: Some(404), .. })
    }

    /// Whether re-triggering the same action later could plausibly succeed
    /// without the user changing anything.
    pub fn is_retryable(&self) -> bool {
        match self {
            GitHubError::RequestTimeout { .. } | GitHubError::RateLimited { .. } => true,
            GitHubError::RequestFailed { status, .. } => match status {
                None => true,
                Some(code) => *code >= 500,
            },
            GitHubError::AuthenticationFailed { .. }
            | GitHubError::ContentDecodeFailed { .. }
            | GitHubError::PaginationLimitExceeded { .. }
            | GitHubError::InvalidCoordinates(_) => false,
        }
    }

    pub fn reset_at(&self) -> Option<u64> {
        match self {
            GitHubError::RateLimited { reset_at, .. } => *reset_at,
            _ => None,
        }
    }

    /// Time left until the rate limit window resets.
    ///
    /// Returns `None` when the failure is not a rate limit or GitHub did not
    /// report a reset time; a reset time already in the past yields zero.
    pub fn retry_after(&self) -> Option<Duration> {
        let reset_at = self.reset_at()?;
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|duration| duration.as_secs())
            .unwrap_or(0);
        Some(Duration::from_secs(reset_at.saturating_sub(now)))
    }
}
