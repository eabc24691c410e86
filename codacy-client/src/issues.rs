//! Category overview endpoint

use crate::CodacyClient;
use crate::error::Result;
use codacy_core::domain::issues::IssueCategoryCounts;
use codacy_core::domain::repository::RepositoryId;
use codacy_core::dto::analysis::CategoryOverviewResponse;
use tracing::warn;

impl CodacyClient {
    /// Fetch the issue count of every category for one repository
    ///
    /// # Arguments
    /// * `repository` - The repository name as listed by the service
    ///
    /// # Returns
    /// Mapping of category name to number of open issues
    pub async fn fetch_issue_counts(&self, repository: &RepositoryId) -> Result<IssueCategoryCounts> {
        let url = format!(
            "{}/repositories/{}/category-overviews",
            self.organization_url(),
            urlencoding::encode(repository.as_str())
        );
        let response = self.get(&url).send().await?;

        let overview: CategoryOverviewResponse = self.handle_response(response).await?;
        for category in overview.duplicate_categories() {
            warn!(
                "Category {} reported more than once for {}, keeping the last count",
                category, repository
            );
        }
        Ok(overview.into())
    }
}
