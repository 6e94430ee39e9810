use serde::Serialize;

use crate::github::types::{ChangedFile, PullRequestMetadata, RepoCoordinates};

/// Normalised pull request summary carried by a [`Snapshot`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PullRequestSummary {
    pub number: u64,
    pub title: String,
    /// PR body; an absent body becomes an empty string.
    pub description: String,
    pub author: String,
    pub url: String,
    pub base_sha: String,
    pub head_sha: String,
    pub changed_files_count: u64,
    pub additions: u64,
    pub deletions: u64,
}

impl From<PullRequestMetadata> for PullRequestSummary {
    fn from(metadata: PullRequestMetadata) -> Self {
        Self {
            number: metadata.number,
            title: metadata.title,
            description: metadata.body.unwrap_or_default(),
            author: metadata
                .user
                .map(|user| user.login)
                .unwrap_or_else(|| "unknown".to_string()),
            url: metadata.html_url,
            base_sha: metadata.base.sha,
            head_sha: metadata.head.sha,
            changed_files_count: metadata.changed_files,
            additions: metadata.additions,
            deletions: metadata.deletions,
        }
    }
}

/// A changed file paired with its content on both sides of the diff.
/// `None` means the file does not exist at that revision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileSnapshot {
    #[serde(flatten)]
    pub file: ChangedFile,
    pub content_before: Option<String>,
    pub content_after: Option<String>,
}

/// Point-in-time aggregate of a pull request: metadata plus every changed
/// file with its before/after content, in GitHub's file order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    repository: RepoCoordinates,
    pull_request: PullRequestSummary,
    files: Vec<FileSnapshot>,
}

impl Snapshot {
    pub(crate) fn new(
        repository: RepoCoordinates,
        pull_request: PullRequestSummary,
        files: Vec<FileSnapshot>,
    ) -> Self {
        Self {
            repository,
            pull_request,
            files,
        }
    }

    pub fn repository(&self) -> &RepoCoordinates {
        &self.repository
    }

    pub fn pull_request(&self) -> &PullRequestSummary {
        &self.pull_request
    }

    pub fn files(&self) -> &[FileSnapshot] {
        &self.files
    }
}
