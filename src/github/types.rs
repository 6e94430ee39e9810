use serde::{Deserialize, Serialize};

use super::error::GitHubError;

/// Owner and name of a GitHub repository.
/// Both parts are validated non-empty when constructed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepoCoordinates {
    owner: String,
    name: String,
}

impl RepoCoordinates {
    pub fn new(owner: &str, name: &str) -> Result<Self, GitHubError> {
        let owner = owner.trim();
        let name = name.trim();
        if owner.is_empty() || name.is_empty() {
            return Err(GitHubError::InvalidCoordinates(format!(
                "owner and repository name must be non-empty (got {owner:?}/{name:?})"
            )));
        }
        Ok(Self {
            owner: owner.to_string(),
            name: name.to_string(),
        })
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// A repository plus pull request number: the scope of one client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequestScope {
    repo: RepoCoordinates,
    number: u64,
}

impl PullRequestScope {
    pub fn new(owner: &str, name: &str, number: u64) -> Result<Self, GitHubError> {
        let repo = RepoCoordinates::new(owner, name)?;
        if number == 0 {
            return Err(GitHubError::InvalidCoordinates(
                "pull request number must be a positive integer".to_string(),
            ));
        }
        Ok(Self { repo, number })
    }

    /// Parse a GitHub PR URL into its scope.
    ///
    /// Expected format: https://github.com/{owner}/{repo}/pull/{number}
    /// Trailing tab segments (`/files`, `/commits`) are accepted since the
    /// review action can be triggered from any tab of the PR page.
    pub fn from_pr_url(url: &str) -> Result<Self, GitHubError> {
        let invalid = || GitHubError::InvalidCoordinates(format!("not a GitHub PR URL: {url}"));

        let parsed = reqwest::Url::parse(url).map_err(|_| invalid())?;
        if parsed.host_str() != Some("github.com") {
            return Err(invalid());
        }

        let segments: Vec<_> = parsed
            .path_segments()
            .ok_or_else(invalid)?
            .filter(|segment| !segment.is_empty())
            .collect();

        if segments.len() < 4 || segments[2] != "pull" {
            return Err(invalid());
        }

        let number = segments[3].parse::<u64>().map_err(|_| invalid())?;
        Self::new(segments[0], segments[1], number)
    }

    pub fn repo(&self) -> &RepoCoordinates {
        &self.repo
    }

    pub fn number(&self) -> u64 {
        self.number
    }

    /// API path of the pull request resource, e.g. `/repos/o/r/pulls/1`.
    pub fn pull_path(&self) -> String {
        format!(
            "/repos/{}/{}/pulls/{}",
            self.repo.owner, self.repo.name, self.number
        )
    }

    pub fn files_path(&self) -> String {
        format!("{}/files", self.pull_path())
    }

    pub fn contents_path(&self) -> String {
        format!("/repos/{}/{}/contents", self.repo.owner, self.repo.name)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct GitHubUser {
    pub login: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GitRef {
    pub sha: String,
    #[serde(rename = "ref")]
    pub name: String,
}

/// Pull request metadata as returned by `GET /repos/{o}/{r}/pulls/{n}`.
#[derive(Debug, Clone, Deserialize)]
pub struct PullRequestMetadata {
    pub number: u64,
    pub title: String,
    pub body: Option<String>,
    pub html_url: String,
    pub user: Option<GitHubUser>,
    pub base: GitRef,
    pub head: GitRef,
    #[serde(default)]
    pub changed_files: u64,
    #[serde(default)]
    pub additions: u64,
    #[serde(default)]
    pub deletions: u64,
}

/// Change status of a file within a pull request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    Added,
    Removed,
    Modified,
    Renamed,
    Copied,
    Changed,
    Unchanged,
    #[serde(other)]
    Unknown,
}

impl std::fmt::Display for FileStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            FileStatus::Added => "added",
            FileStatus::Removed => "removed",
            FileStatus::Modified => "modified",
            FileStatus::Renamed => "renamed",
            FileStatus::Copied => "copied",
            FileStatus::Changed => "changed",
            FileStatus::Unchanged => "unchanged",
            FileStatus::Unknown => "unknown",
        };
        write!(f, "{label}")
    }
}

/// One entry of `GET /repos/{o}/{r}/pulls/{n}/files`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all(serialize = "camelCase"))]
pub struct ChangedFile {
    #[serde(default)]
    pub sha: Option<String>,
    pub filename: String,
    pub status: FileStatus,
    #[serde(default)]
    pub additions: u64,
    #[serde(default)]
    pub deletions: u64,
    #[serde(default)]
    pub changes: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patch: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_filename: Option<String>,
}

impl ChangedFile {
    /// Path the file had at the base revision.
    pub fn base_path(&self) -> &str {
        self.previous_filename.as_deref().unwrap_or(&self.filename)
    }
}

/// Body of `GET /repos/{o}/{r}/contents/{path}`.
#[derive(Debug, Clone, Deserialize)]
pub struct ContentResponse {
    pub content: Option<String>,
    pub encoding: Option<String>,
}
