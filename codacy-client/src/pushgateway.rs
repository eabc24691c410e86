//! Prometheus pushgateway client
//!
//! Each sample is pushed as its own group (`Categories`, `Repository`) with a
//! `PUT`, which replaces whatever the group held before. Re-running the
//! exporter therefore overwrites the previous snapshot instead of adding to it.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use codacy_core::domain::issues::IssueSample;
use prometheus::{Encoder, Gauge, Opts, Registry, TextEncoder};
use reqwest::Client;

use crate::error::{ClientError, Result};

/// Gauge name used when none is configured
pub const DEFAULT_METRIC_NAME: &str = "codacy_issues_metric";

/// Gauge help text used when none is configured
pub const DEFAULT_METRIC_HELP: &str = "Number of issues in Codacy code";

/// Grouping label holding the issue category
const CATEGORY_LABEL: &str = "Categories";

/// Grouping label holding the repository name
const REPOSITORY_LABEL: &str = "Repository";

/// HTTP client for a Prometheus pushgateway
#[derive(Debug, Clone)]
pub struct PushgatewayClient {
    /// Base URL of the pushgateway (e.g., "http://localhost:9091")
    base_url: String,
    /// Pushgateway job name of every pushed group
    job: String,
    metric_name: String,
    metric_help: String,
    client: Client,
}

impl PushgatewayClient {
    /// Create a new pushgateway client using the default gauge name as job
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, Client::new())
    }

    /// Create a new pushgateway client with a custom HTTP client
    pub fn with_client(base_url: impl Into<String>, client: Client) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            job: DEFAULT_METRIC_NAME.to_string(),
            metric_name: DEFAULT_METRIC_NAME.to_string(),
            metric_help: DEFAULT_METRIC_HELP.to_string(),
            client,
        }
    }

    /// Use a different gauge name; the job name follows the gauge name
    pub fn with_metric(mut self, name: impl Into<String>, help: impl Into<String>) -> Self {
        self.metric_name = name.into();
        self.metric_help = help.into();
        self.job = self.metric_name.clone();
        self
    }

    /// Get the base URL of the pushgateway
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn metric_name(&self) -> &str {
        &self.metric_name
    }

    /// URL of the group a sample is pushed to
    pub fn group_url(&self, sample: &IssueSample) -> String {
        format!(
            "{}/metrics/{}/{}/{}",
            self.base_url,
            encode_label("job", &self.job),
            encode_label(CATEGORY_LABEL, &sample.category),
            encode_label(REPOSITORY_LABEL, sample.repository.as_str())
        )
    }

    /// Render a sample as a single gauge in the text exposition format
    ///
    /// # Returns
    /// The body and its content type
    pub fn encode_sample(&self, sample: &IssueSample) -> Result<(Vec<u8>, String)> {
        let gauge = Gauge::with_opts(Opts::new(
            self.metric_name.clone(),
            self.metric_help.clone(),
        ))?;
        gauge.set(sample.value as f64);

        let registry = Registry::new();
        registry.register(Box::new(gauge))?;

        let encoder = TextEncoder::new();
        let mut body = Vec::new();
        encoder.encode(&registry.gather(), &mut body)?;

        Ok((body, encoder.format_type().to_string()))
    }

    /// Push one sample, replacing its group on the pushgateway
    pub async fn push_sample(&self, sample: &IssueSample) -> Result<()> {
        if sample.category.is_empty() {
            return Err(ClientError::InvalidRequest(format!(
                "empty category for repository {}",
                sample.repository
            )));
        }

        let (body, content_type) = self.encode_sample(sample)?;
        let url = self.group_url(sample);

        let response = self
            .client
            .put(&url)
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ClientError::api_error(status.as_u16(), error_text));
        }

        Ok(())
    }
}

/// Encode one `name/value` path pair of a pushgateway grouping key
///
/// Values that are empty or contain `/` cannot be expressed as a plain path
/// segment and are sent base64url-encoded with an `@base64` suffix on the name.
pub fn encode_label(name: &str, value: &str) -> String {
    if value.is_empty() {
        format!("{}@base64/=", name)
    } else if value.contains('/') {
        format!("{}@base64/{}", name, URL_SAFE_NO_PAD.encode(value))
    } else {
        format!("{}/{}", name, urlencoding::encode(value))
    }
}
