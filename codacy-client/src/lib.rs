//! Codacy HTTP Clients
//!
//! Typed async clients for the two remote services the exporter talks to:
//! - [`CodacyClient`]: lists repositories of an organization and fetches
//!   per-category issue counts from the Codacy analysis API
//! - [`PushgatewayClient`]: pushes one gauge sample per category to a
//!   Prometheus pushgateway
//!
//! # Example
//!
//! ```no_run
//! use codacy_client::CodacyClient;
//!
//! #[tokio::main]
//! async fn main() -> codacy_client::Result<()> {
//!     let client = CodacyClient::new("https://app.codacy.com/api/v3", "gh", "acme", "token");
//!
//!     for repository in client.list_repositories().await? {
//!         let counts = client.fetch_issue_counts(&repository).await?;
//!         println!("{}: {} categories", repository, counts.len());
//!     }
//!     Ok(())
//! }
//! ```

pub mod error;
mod issues;
mod pushgateway;
mod repositories;

#[cfg(test)]
mod test_support;

// Re-export commonly used types
pub use error::{ClientError, Result};
pub use pushgateway::{DEFAULT_METRIC_HELP, DEFAULT_METRIC_NAME, PushgatewayClient};

use reqwest::Client;
use serde::de::DeserializeOwned;
use std::fmt;

/// Default page size used when listing repositories
pub const DEFAULT_PAGE_SIZE: u32 = 100;

/// HTTP client for the Codacy analysis API (v3)
///
/// Every request carries the organization's API token in the `api-token`
/// header. The token is never printed by the `Debug` implementation.
#[derive(Clone)]
pub struct CodacyClient {
    /// Base URL of the API (e.g., "https://app.codacy.com/api/v3")
    base_url: String,
    /// Git provider short name (e.g., "gh")
    provider: String,
    /// Organization name on the provider
    organization: String,
    api_token: String,
    page_size: u32,
    /// HTTP client instance
    client: Client,
}

impl CodacyClient {
    /// Create a new Codacy client
    ///
    /// # Arguments
    /// * `base_url` - The base URL of the API
    /// * `provider` - Git provider short name (`gh`, `gl`, `bb`)
    /// * `organization` - Organization name
    /// * `api_token` - Account API token
    pub fn new(
        base_url: impl Into<String>,
        provider: impl Into<String>,
        organization: impl Into<String>,
        api_token: impl Into<String>,
    ) -> Self {
        Self::with_client(base_url, provider, organization, api_token, Client::new())
    }

    /// Create a new Codacy client with a custom HTTP client
    ///
    /// This allows you to configure timeouts, proxies, TLS settings, etc.
    ///
    /// # Example
    /// ```
    /// use codacy_client::CodacyClient;
    /// use reqwest::Client;
    /// use std::time::Duration;
    ///
    /// let http_client = Client::builder()
    ///     .timeout(Duration::from_secs(10))
    ///     .build()
    ///     .unwrap();
    ///
    /// let client = CodacyClient::with_client(
    ///     "https://app.codacy.com/api/v3",
    ///     "gh",
    ///     "acme",
    ///     "token",
    ///     http_client,
    /// );
    /// ```
    pub fn with_client(
        base_url: impl Into<String>,
        provider: impl Into<String>,
        organization: impl Into<String>,
        api_token: impl Into<String>,
        client: Client,
    ) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            provider: provider.into(),
            organization: organization.into(),
            api_token: api_token.into(),
            page_size: DEFAULT_PAGE_SIZE,
            client,
        }
    }

    /// Override the page size used when listing repositories
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Get the base URL of the API
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Get the organization this client queries
    pub fn organization(&self) -> &str {
        &self.organization
    }

    /// URL of the organization resource all analysis endpoints hang off
    fn organization_url(&self) -> String {
        format!(
            "{}/analysis/organizations/{}/{}",
            self.base_url,
            urlencoding::encode(&self.provider),
            urlencoding::encode(&self.organization)
        )
    }

    /// Authenticated GET request builder
    fn get(&self, url: &str) -> reqwest::RequestBuilder {
        self.client
            .get(url)
            .header(reqwest::header::ACCEPT, "application/json")
            .header("api-token", &self.api_token)
    }

    // =============================================================================
    // Response Handlers
    // =============================================================================

    /// Handle an API response and deserialize JSON
    ///
    /// This method checks the status code and returns an appropriate error if
    /// the request failed, or deserializes the response body if successful.
    async fn handle_response<T: DeserializeOwned>(&self, response: reqwest::Response) -> Result<T> {
        let status = response.status();

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ClientError::api_error(status.as_u16(), error_text));
        }

        response
            .json()
            .await
            .map_err(|e| ClientError::ParseError(format!("Failed to parse JSON response: {}", e)))
    }
}

impl fmt::Debug for CodacyClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CodacyClient")
            .field("base_url", &self.base_url)
            .field("provider", &self.provider)
            .field("organization", &self.organization)
            .field("api_token", &"<redacted>")
            .finish()
    }
}
