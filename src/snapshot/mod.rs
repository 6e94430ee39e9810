pub mod types;

pub use types::{FileSnapshot, PullRequestSummary, Snapshot};

use futures::{stream, StreamExt, TryStreamExt};
use tracing::{debug, info, instrument};

use crate::github::types::{ChangedFile, FileStatus};
use crate::github::{GitHubClient, GitHubError};

impl GitHubClient {
    /// Assemble the complete snapshot of this client's pull request.
    ///
    /// Metadata and the file list are fetched concurrently, then every file's
    /// before/after content is resolved at the metadata's base/head shas.
    /// All files are resolved concurrently (bounded by
    /// `ClientOptions::max_concurrent_files` when set) but keep GitHub's
    /// order. The first failure aborts the snapshot and drops every pending
    /// request; no partial snapshot is ever returned.
    #[instrument(skip(self), fields(owner = %self.scope().repo().owner(), repo = %self.scope().repo().name(), pr = self.scope().number()))]
    pub async fn fetch_snapshot(&self) -> Result<Snapshot, GitHubError> {
        let (metadata, files) =
            tokio::try_join!(self.get_pull_request_metadata(), self.get_changed_files())?;
        debug!(
            files = files.len(),
            base = %metadata.base.sha,
            head = %metadata.head.sha,
            "fetched metadata and file list"
        );

        let limit = self
            .max_concurrent_files()
            .unwrap_or(files.len())
            .max(1);
        let base_sha = metadata.base.sha.clone();
        let head_sha = metadata.head.sha.clone();

        let resolved: Vec<FileSnapshot> = stream::iter(files)
            .map(|file| self.resolve_file(file, &base_sha, &head_sha))
            .buffered(limit)
            .try_collect()
            .await?;

        info!(files = resolved.len(), "assembled snapshot");
        Ok(Snapshot::new(
            self.scope().repo().clone(),
            PullRequestSummary::from(metadata),
            resolved,
        ))
    }

    async fn resolve_file(
        &self,
        file: ChangedFile,
        base_sha: &str,
        head_sha: &str,
    ) -> Result<FileSnapshot, GitHubError> {
        let before = async {
            if file.status == FileStatus::Added {
                Ok(None)
            } else {
                self.get_file_content(file.base_path(), base_sha).await
            }
        };
        let after = async {
            if file.status == FileStatus::Removed {
                Ok(None)
            } else {
                self.get_file_content(&file.filename, head_sha).await
            }
        };

        let (content_before, content_after) = tokio::try_join!(before, after)?;
        Ok(FileSnapshot {
            file,
            content_before,
            content_after,
        })
    }
}
