//! Exporter configuration
//!
//! Defines every tunable of a run: credentials, service endpoints, the
//! worker pool size and the per-request timeout.

use std::fmt;
use std::time::Duration;

/// Default Codacy API base URL
pub const DEFAULT_CODACY_URL: &str = "https://app.codacy.com/api/v3";

/// Default git provider short name
pub const DEFAULT_PROVIDER: &str = "gh";

/// Default pushgateway URL
pub const DEFAULT_PUSHGATEWAY_URL: &str = "http://localhost:9091";

/// Default number of concurrent workers
pub const DEFAULT_WORKERS: usize = 4;

/// Default timeout of every remote call, in seconds
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

/// Exporter configuration
#[derive(Clone)]
pub struct Config {
    /// Codacy account API token
    pub api_token: String,

    /// Organization whose repositories are exported
    pub organization: String,

    /// Git provider short name (gh, gl, bb)
    pub provider: String,

    /// Codacy API base URL
    pub codacy_url: String,

    /// Pushgateway base URL
    pub pushgateway_url: String,

    /// Number of repositories processed concurrently
    pub workers: usize,

    /// Timeout applied to each HTTP request
    pub request_timeout: Duration,

    /// Gauge name pushed for every category
    pub metric_name: String,

    /// Log samples instead of pushing them
    pub dry_run: bool,
}

impl Config {
    /// Creates a new configuration with defaults
    pub fn new(api_token: String, organization: String) -> Self {
        Self {
            api_token,
            organization,
            provider: DEFAULT_PROVIDER.to_string(),
            codacy_url: DEFAULT_CODACY_URL.to_string(),
            pushgateway_url: DEFAULT_PUSHGATEWAY_URL.to_string(),
            workers: DEFAULT_WORKERS,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            metric_name: codacy_client::DEFAULT_METRIC_NAME.to_string(),
            dry_run: false,
        }
    }

    /// Validates the configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.api_token.trim().is_empty() {
            anyhow::bail!("api_token cannot be empty");
        }

        if self.organization.trim().is_empty() {
            anyhow::bail!("organization cannot be empty");
        }

        if self.provider.trim().is_empty() {
            anyhow::bail!("provider cannot be empty");
        }

        for (name, url) in [
            ("codacy_url", &self.codacy_url),
            ("pushgateway_url", &self.pushgateway_url),
        ] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                anyhow::bail!("{} must start with http:// or https://", name);
            }
        }

        if self.workers == 0 {
            anyhow::bail!("workers must be greater than 0");
        }

        if self.request_timeout.is_zero() {
            anyhow::bail!("request_timeout must be greater than 0");
        }

        if self.metric_name.is_empty() {
            anyhow::bail!("metric_name cannot be empty");
        }

        Ok(())
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("api_token", &"<redacted>")
            .field("organization", &self.organization)
            .field("provider", &self.provider)
            .field("codacy_url", &self.codacy_url)
            .field("pushgateway_url", &self.pushgateway_url)
            .field("workers", &self.workers)
            .field("request_timeout", &self.request_timeout)
            .field("metric_name", &self.metric_name)
            .field("dry_run", &self.dry_run)
            .finish()
    }
}
