//! Repository lister
//!
//! Enumerates the repositories whose issues are exported in this run.

use anyhow::{Context, Result};
use async_trait::async_trait;
use codacy_client::CodacyClient;
use codacy_core::domain::repository::RepositoryId;

/// Source of the repositories to process
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RepositoryLister: Send + Sync {
    /// Lists every repository of the configured organization, in service order
    async fn list_repositories(&self) -> Result<Vec<RepositoryId>>;
}

/// HTTP implementation of RepositoryLister backed by the Codacy API
pub struct HttpRepositoryLister {
    client: CodacyClient,
}

impl HttpRepositoryLister {
    pub fn new(client: CodacyClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl RepositoryLister for HttpRepositoryLister {
    async fn list_repositories(&self) -> Result<Vec<RepositoryId>> {
        self.client
            .list_repositories()
            .await
            .with_context(|| {
                format!(
                    "Failed to list repositories of organization {}",
                    self.client.organization()
                )
            })
    }
}
