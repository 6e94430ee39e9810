//! Rate-limit signals read from GitHub response headers.
//!
//! Only consulted once a request has already failed with 401/403/429, to
//! tell quota exhaustion apart from a rejected credential.

use reqwest::header::HeaderMap;

pub const REMAINING_HEADER: &str = "x-ratelimit-remaining";
pub const RESET_HEADER: &str = "x-ratelimit-reset";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RateLimitHeaders {
    /// Raw `x-ratelimit-remaining` value.
    remaining: Option<String>,
    /// Unix epoch seconds from `x-ratelimit-reset`.
    reset_at: Option<u64>,
}

impl RateLimitHeaders {
    pub fn new(remaining: Option<&str>, reset_at: Option<u64>) -> Self {
        Self {
            remaining: remaining.map(|value| value.trim().to_string()),
            reset_at,
        }
    }

    pub fn from_headers(headers: &HeaderMap) -> Self {
        let read = |name: &str| {
            headers
                .get(name)
                .and_then(|value| value.to_str().ok())
                .map(str::trim)
        };
        let reset_at = read(RESET_HEADER).and_then(|raw| raw.parse::<u64>().ok());
        Self::new(read(REMAINING_HEADER), reset_at)
    }

    /// True when GitHub reported zero remaining requests.
    pub fn is_exhausted(&self) -> bool {
        self.remaining.as_deref() == Some("0")
    }

    pub fn reset_at(&self) -> Option<u64> {
        self.reset_at
    }
}
