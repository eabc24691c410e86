//! Issue fetcher
//!
//! Retrieves the per-category issue counts of a single repository.

use anyhow::{Context, Result};
use async_trait::async_trait;
use codacy_client::CodacyClient;
use codacy_core::domain::issues::IssueCategoryCounts;
use codacy_core::domain::repository::RepositoryId;

/// Source of issue counts for one repository
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IssueFetcher: Send + Sync {
    /// Fetches the issue count of every category of `repository`
    ///
    /// Any transport, status or decode failure is an error; a partial
    /// mapping is never returned.
    async fn fetch_issues(&self, repository: &RepositoryId) -> Result<IssueCategoryCounts>;
}

/// HTTP implementation of IssueFetcher backed by the Codacy API
pub struct HttpIssueFetcher {
    client: CodacyClient,
}

impl HttpIssueFetcher {
    pub fn new(client: CodacyClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl IssueFetcher for HttpIssueFetcher {
    async fn fetch_issues(&self, repository: &RepositoryId) -> Result<IssueCategoryCounts> {
        self.client
            .fetch_issue_counts(repository)
            .await
            .with_context(|| format!("Failed to fetch category overview of {}", repository))
    }
}
