use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use tracing::{debug, instrument};

use super::error::GitHubError;
use super::types::ContentResponse;
use super::GitHubClient;

impl GitHubClient {
    /// Text of `path` at `revision`, or `None` when the file does not exist
    /// there.
    ///
    /// An empty path or revision means the file does not apply on that side
    /// of the diff, so no request is made. A 404 is the same "absent" case;
    /// every other failure propagates.
    #[instrument(skip(self))]
    pub async fn get_file_content(
        &self,
        path: &str,
        revision: &str,
    ) -> Result<Option<String>, GitHubError> {
        if path.is_empty() || revision.is_empty() {
            return Ok(None);
        }

        let resource = format!(
            "{}/{}?ref={}",
            self.scope.contents_path(),
            encode_path(path),
            urlencoding::encode(revision)
        );

        let response: ContentResponse = match self.get_json(&resource).await {
            Ok(response) => response,
            Err(err) if err.is_not_found() => {
                debug!("file absent at revision");
                return Ok(None);
            }
            Err(err) => return Err(err),
        };

        decode_content(path, response)
    }
}

/// Percent-encode each `/`-separated segment on its own so the separators
/// survive.
pub fn encode_path(path: &str) -> String {
    path.split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

fn decode_content(path: &str, response: ContentResponse) -> Result<Option<String>, GitHubError> {
    let Some(content) = response.content else {
        return Ok(None);
    };

    match response.encoding.as_deref() {
        Some("base64") => decode_base64(path, &content).map(Some),
        // GitHub's marker for blobs too large to inline.
        Some("none") => Ok(None),
        _ => Ok(Some(content)),
    }
}

fn decode_base64(path: &str, encoded: &str) -> Result<String, GitHubError> {
    let cleaned: String = encoded.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    let bytes = STANDARD
        .decode(cleaned)
        .map_err(|e| GitHubError::ContentDecodeFailed {
            path: path.to_string(),
            reason: e.to_string(),
        })?;
    let text = String::from_utf8(bytes).map_err(|e| GitHubError::ContentDecodeFailed {
        path: path.to_string(),
        reason: format!("content is not valid UTF-8: {e}"),
    })?;
    debug!(bytes = text.len(), "decoded base64 content");
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::github::test_support::client_for;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const CONTENT_PATH: &str = "/repos/org/repo/contents/src/lib.rs";

    async fn mount_content(server: &MockServer, response: ResponseTemplate) {
        Mock::given(method("GET"))
            .and(path(CONTENT_PATH))
            .and(query_param("ref", "abc123"))
            .respond_with(response)
            .mount(server)
            .await;
    }

    #[test]
    fn test_encode_path_keeps_separators() {
        assert_eq!(encode_path("src/lib.rs"), "src/lib.rs");
        assert_eq!(encode_path("docs/my file#1.md"), "docs/my%20file%231.md");
        assert_eq!(encode_path("a?b/c&d"), "a%3Fb/c%26d");
    }

    #[test]
    fn test_decode_base64_with_line_breaks() {
        let decoded = decode_base64("f", "aGVs\nbG8g\nd29y\nbGQ=\n").unwrap();
        assert_eq!(decoded, "hello world");
    }

    #[test]
    fn test_non_utf8_content_fails() {
        // 0xFF 0xFE
        let err = decode_base64("bin", "//4=").unwrap_err();
        assert!(matches!(err, GitHubError::ContentDecodeFailed { .. }));
    }

    #[test]
    fn test_plain_and_oversized_encodings() {
        let plain = ContentResponse {
            content: Some("raw text".to_string()),
            encoding: Some("utf-8".to_string()),
        };
        assert_eq!(decode_content("f", plain).unwrap().as_deref(), Some("raw text"));

        let too_large = ContentResponse {
            content: Some(String::new()),
            encoding: Some("none".to_string()),
        };
        assert_eq!(decode_content("f", too_large).unwrap(), None);

        let missing = ContentResponse {
            content: None,
            encoding: None,
        };
        assert_eq!(decode_content("f", missing).unwrap(), None);
    }

    #[tokio::test]
    async fn test_decodes_base64_payload() {
        let server = MockServer::start().await;
        mount_content(
            &server,
            ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "content": "aGVsbG8=",
                "encoding": "base64"
            })),
        )
        .await;

        let content = client_for(&server, None)
            .get_file_content("src/lib.rs", "abc123")
            .await
            .unwrap();
        assert_eq!(content.as_deref(), Some("hello"));
    }

    #[tokio::test]
    async fn test_not_found_is_absent() {
        let server = MockServer::start().await;
        mount_content(&server, ResponseTemplate::new(404).set_body_string("Not Found")).await;

        let content = client_for(&server, None)
            .get_file_content("src/lib.rs", "abc123")
            .await
            .unwrap();
        assert_eq!(content, None);
    }

    #[tokio::test]
    async fn test_malformed_base64_fails() {
        let server = MockServer::start().await;
        mount_content(
            &server,
            ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "content": "not*valid*base64",
                "encoding": "base64"
            })),
        )
        .await;

        let err = client_for(&server, None)
            .get_file_content("src/lib.rs", "abc123")
            .await
            .unwrap_err();
        assert!(matches!(err, GitHubError::ContentDecodeFailed { path: ref failed_path, .. } if failed_path == "src/lib.rs"));
    }

    #[tokio::test]
    async fn test_empty_path_or_revision_issues_no_request() {
        let server = MockServer::start().await;
        let client = client_for(&server, None);

        assert_eq!(client.get_file_content("", "abc123").await.unwrap(), None);
        assert_eq!(client.get_file_content("src/lib.rs", "").await.unwrap(), None);
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_other_failures_propagate() {
        let server = MockServer::start().await;
        mount_content(&server, ResponseTemplate::new(500).set_body_string("boom")).await;

        let err = client_for(&server, None)
            .get_file_content("src/lib.rs", "abc123")
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(500));
    }
}
