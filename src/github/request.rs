use reqwest::header::ACCEPT;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use super::error::GitHubError;
use super::rate_limit::RateLimitHeaders;
use super::GitHubClient;

pub const GITHUB_MEDIA_TYPE: &str = "application/vnd.github+json";
pub const API_VERSION_HEADER: &str = "X-GitHub-Api-Version";
pub const API_VERSION: &str = "2022-11-28";

impl GitHubClient {
    /// GET `path` relative to the API base and parse the JSON body.
    ///
    /// The timeout covers the whole exchange, body included. Its timer lives
    /// inside the returned future, so it is released on every exit path.
    pub(crate) async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, GitHubError> {
        let url = format!("{}{}", self.base_url, path);
        debug!(%url, "GET");

        match tokio::time::timeout(self.timeout, self.execute(&url)).await {
            Ok(result) => result,
            Err(_) => {
                warn!(%url, timeout_secs = self.timeout.as_secs_f64(), "GitHub request timed out");
                Err(GitHubError::RequestTimeout {
                    url,
                    timeout: self.timeout,
                })
            }
        }
    }

    async fn execute<T: DeserializeOwned>(&self, url: &str) -> Result<T, GitHubError> {
        let mut request = self
            .http
            .get(url)
            .header(ACCEPT, GITHUB_MEDIA_TYPE)
            .header(API_VERSION_HEADER, API_VERSION);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| self.transport_error(url, e))?;
        let status = response.status();

        if !status.is_success() {
            let rate_limit = RateLimitHeaders::from_headers(response.headers());
            let body = response
                .text()
                .await
                .map_err(|e| self.transport_error(url, e))?;
            let error = classify_failure(url, status.as_u16(), &rate_limit, body);
            debug!(%url, status = status.as_u16(), error = %error, "GitHub request failed");
            return Err(error);
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| self.transport_error(url, e))?;
        debug!(%url, status = status.as_u16(), bytes = bytes.len(), "GitHub request succeeded");

        serde_json::from_slice(&bytes).map_err(|e| GitHubError::RequestFailed {
            url: url.to_string(),
            status: Some(status.as_u16()),
            message: format!("unexpected response body: {e}"),
            body: None,
        })
    }

    fn transport_error(&self, url: &str, error: reqwest::Error) -> GitHubError {
        if error.is_timeout() {
            return GitHubError::RequestTimeout {
                url: url.to_string(),
                timeout: self.timeout,
            };
        }
        GitHubError::RequestFailed {
            url: url.to_string(),
            status: None,
            message: error.to_string(),
            body: None,
        }
    }
}

/// Map a non-2xx response onto the error taxonomy.
///
/// 401/403 count as a rate limit only when GitHub reports zero remaining
/// quota; 429 is always the secondary rate limit.
pub fn classify_failure(
    url: &str,
    status: u16,
    rate_limit: &RateLimitHeaders,
    body: String,
) -> GitHubError {
    let url = url.to_string();
    match status {
        401 | 403 if rate_limit.is_exhausted() => GitHubError::RateLimited {
            url,
            status,
            reset_at: rate_limit.reset_at(),
            secondary: false,
        },
        401 | 403 => GitHubError::AuthenticationFailed { url, status, body },
        429 => GitHubError::RateLimited {
            url,
            status,
            reset_at: rate_limit.reset_at(),
            secondary: true,
        },
        _ => GitHubError::RequestFailed {
            url,
            status: Some(status),
            message: format!("GitHub API returned status {status}"),
            body: Some(body),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::github::test_support::{client_for, scope};
    use crate::github::{ClientOptions, GitHubClient};
    use std::time::Duration;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const URL: &str = "https://api.github.com/repos/org/repo/pulls/42";

    #[test]
    fn test_classify_403_with_exhausted_quota_is_rate_limited() {
        let headers = RateLimitHeaders::new(Some("0"), Some(1_700_000_000));
        let err = classify_failure(URL, 403, &headers, String::new());
        assert_eq!(
            err,
            GitHubError::RateLimited {
                url: URL.to_string(),
                status: 403,
                reset_at: Some(1_700_000_000),
                secondary: false,
            }
        );
    }

    #[test]
    fn test_classify_403_without_exhausted_quota_is_auth_failure() {
        for headers in [RateLimitHeaders::default(), RateLimitHeaders::new(Some("42"), None)] {
            let err = classify_failure(URL, 403, &headers, "Bad credentials".to_string());
            assert!(matches!(err, GitHubError::AuthenticationFailed { status: 403, .. }));
        }
        let err = classify_failure(URL, 401, &RateLimitHeaders::default(), String::new());
        assert!(matches!(err, GitHubError::AuthenticationFailed { status: 401, .. }));
    }

    #[test]
    fn test_classify_429_is_secondary_rate_limit() {
        let err = classify_failure(URL, 429, &RateLimitHeaders::new(Some("100"), None), String::new());
        assert!(matches!(
            err,
            GitHubError::RateLimited { status: 429, reset_at: None, secondary: true, .. }
        ));
    }

    #[test]
    fn test_classify_other_status_keeps_body() {
        let err = classify_failure(URL, 500, &RateLimitHeaders::default(), "oops".to_string());
        assert_eq!(err.status(), Some(500));
        match err {
            GitHubError::RequestFailed { body, .. } => assert_eq!(body.as_deref(), Some("oops")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_sends_standard_headers_and_bearer_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/ping"))
            .and(header("accept", GITHUB_MEDIA_TYPE))
            .and(header("x-github-api-version", API_VERSION))
            .and(header("authorization", "Bearer secret-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "ok": true })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server, Some("secret-token"));
        let body: serde_json::Value = client.get_json("/ping").await.unwrap();
        assert_eq!(body["ok"], true);
    }

    #[tokio::test]
    async fn test_anonymous_request_has_no_authorization_header() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/ping"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .mount(&server)
            .await;

        let client = client_for(&server, None);
        let _: serde_json::Value = client.get_json("/ping").await.unwrap();

        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 1);
        assert!(requests[0].headers.get("authorization").is_none());
    }

    #[tokio::test]
    async fn test_403_with_zero_remaining_is_rate_limited() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/ping"))
            .respond_with(
                ResponseTemplate::new(403)
                    .insert_header("x-ratelimit-remaining", "0")
                    .insert_header("x-ratelimit-reset", "1700000000")
                    .set_body_string("API rate limit exceeded"),
            )
            .mount(&server)
            .await;

        let err = client_for(&server, None)
            .get_json::<serde_json::Value>("/ping")
            .await
            .unwrap_err();
        assert_eq!(err.reset_at(), Some(1_700_000_000));
        assert!(matches!(err, GitHubError::RateLimited { status: 403, secondary: false, .. }));
    }

    #[tokio::test]
    async fn test_403_without_rate_limit_header_is_auth_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/ping"))
            .respond_with(ResponseTemplate::new(403).set_body_string("Resource not accessible"))
            .mount(&server)
            .await;

        let err = client_for(&server, Some("weak-token"))
            .get_json::<serde_json::Value>("/ping")
            .await
            .unwrap_err();
        match err {
            GitHubError::AuthenticationFailed { status, body, .. } => {
                assert_eq!(status, 403);
                assert_eq!(body, "Resource not accessible");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_server_error_is_request_failed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/ping"))
            .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
            .mount(&server)
            .await;

        let err = client_for(&server, None)
            .get_json::<serde_json::Value>("/ping")
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(502));
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_malformed_success_body_is_request_failed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/ping"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let err = client_for(&server, None)
            .get_json::<serde_json::Value>("/ping")
            .await
            .unwrap_err();
        assert!(matches!(err, GitHubError::RequestFailed { status: Some(200), .. }));
    }

    #[tokio::test]
    async fn test_slow_response_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/slow"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({}))
                    .set_delay(Duration::from_secs(5)),
            )
            .mount(&server)
            .await;

        let options = ClientOptions {
            api_base_url: server.uri(),
            timeout: Duration::from_millis(100),
            ..ClientOptions::default()
        };
        let client = GitHubClient::new(scope(), None, options).unwrap();
        let err = client.get_json::<serde_json::Value>("/slow").await.unwrap_err();
        assert!(matches!(err, GitHubError::RequestTimeout { .. }));
    }

    #[tokio::test]
    async fn test_connection_failure_is_request_failed_without_status() {
        let options = ClientOptions {
            // Nothing listens on port 9 of localhost in the test environment.
            api_base_url: "http://127.0.0.1:9".to_string(),
            timeout: Duration::from_secs(5),
            ..ClientOptions::default()
        };
        let client = GitHubClient::new(scope(), None, options).unwrap();
        let err = client.get_json::<serde_json::Value>("/ping").await.unwrap_err();
        assert!(matches!(err, GitHubError::RequestFailed { status: None, .. }));
    }
}
