//! Metric publisher
//!
//! Pushes issue samples to the metrics relay, one call per category.

use anyhow::{Context, Result};
use async_trait::async_trait;
use codacy_client::PushgatewayClient;
use codacy_core::domain::issues::IssueSample;
use tracing::info;

/// Sink for issue samples
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MetricPublisher: Send + Sync {
    /// Publishes a single category sample of a repository
    async fn publish(&self, sample: &IssueSample) -> Result<()>;
}

/// HTTP implementation of MetricPublisher backed by a pushgateway
pub struct HttpMetricPublisher {
    client: PushgatewayClient,
}

impl HttpMetricPublisher {
    pub fn new(client: PushgatewayClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl MetricPublisher for HttpMetricPublisher {
    async fn publish(&self, sample: &IssueSample) -> Result<()> {
        self.client.push_sample(sample).await.with_context(|| {
            format!(
                "Failed to push {} of {} to {}",
                sample.category,
                sample.repository,
                self.client.base_url()
            )
        })
    }
}

/// Publisher used for dry runs: logs every sample and pushes nothing
pub struct LoggingMetricPublisher {
    metric_name: String,
}

impl LoggingMetricPublisher {
    pub fn new(metric_name: impl Into<String>) -> Self {
        Self {
            metric_name: metric_name.into(),
        }
    }
}

#[async_trait]
impl MetricPublisher for LoggingMetricPublisher {
    async fn publish(&self, sample: &IssueSample) -> Result<()> {
        info!(
            "[dry-run] {}{{Categories=\"{}\",Repository=\"{}\"}} {}",
            self.metric_name, sample.category, sample.repository, sample.value
        );
        Ok(())
    }
}
