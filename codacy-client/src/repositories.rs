//! Repository listing endpoint

use crate::CodacyClient;
use crate::error::Result;
use codacy_core::domain::repository::RepositoryId;
use codacy_core::dto::analysis::RepositoryListResponse;
use tracing::debug;

impl CodacyClient {
    /// List every repository of the organization
    ///
    /// Follows the pagination cursor until the service stops returning one,
    /// so the result preserves the service's ordering across pages.
    ///
    /// # Returns
    /// The repository names, in listing order
    pub async fn list_repositories(&self) -> Result<Vec<RepositoryId>> {
        let url = format!("{}/repositories", self.organization_url());
        let mut repositories = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            let page = self.list_repositories_page(&url, cursor.as_deref()).await?;
            let before = repositories.len();
            repositories.extend(page.repository_ids());

            debug!(
                "Listed {} repositories (page cursor: {:?})",
                repositories.len() - before,
                cursor
            );

            match page.next_cursor() {
                Some(next) if repositories.len() > before && cursor.as_deref() != Some(next) => {
                    cursor = Some(next.to_string());
                }
                _ => break,
            }
        }

        Ok(repositories)
    }

    async fn list_repositories_page(
        &self,
        url: &str,
        cursor: Option<&str>,
    ) -> Result<RepositoryListResponse> {
        let limit = self.page_size.to_string();
        let mut request = self.get(url).query(&[("limit", limit.as_str())]);
        if let Some(cursor) = cursor {
            request = request.query(&[("cursor", cursor)]);
        }

        let response = request.send().await?;
        self.handle_response(response).await
    }
}
