use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use super::error::GitHubError;
use super::GitHubClient;

/// Hard upper bound on pages fetched from one collection endpoint.
pub const MAX_PAGES: u32 = 100;

impl GitHubClient {
    /// Fetch every page of the collection at `path`, in order.
    ///
    /// Pages are requested one at a time; a page with fewer than `per_page`
    /// items (possibly zero) ends the collection. If page `MAX_PAGES` is
    /// still full the collection is treated as unbounded and the call fails
    /// instead of requesting another page.
    #[instrument(skip(self))]
    pub async fn get_all_pages<T: DeserializeOwned>(
        &self,
        path: &str,
        per_page: usize,
    ) -> Result<Vec<T>, GitHubError> {
        let per_page = per_page.max(1);
        let separator = if path.contains('?') { '&' } else { '?' };
        let mut items = Vec::new();
        let mut page: u32 = 1;

        loop {
            let paged_path = format!("{path}{separator}per_page={per_page}&page={page}");
            let page_items: Vec<T> = self.get_json(&paged_path).await?;
            let count = page_items.len();
            items.extend(page_items);
            debug!(page, count, total = items.len(), "fetched page");

            if count < per_page {
                break;
            }
            if page >= MAX_PAGES {
                return Err(GitHubError::PaginationLimitExceeded {
                    path: path.to_string(),
                    max_pages: MAX_PAGES,
                });
            }
            page += 1;
        }

        Ok(items)
    }
}
