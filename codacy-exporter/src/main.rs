//! Codacy Exporter
//!
//! Republishes Codacy static-analysis issue counts as pushgateway gauges,
//! one sample per repository and issue category.
//!
//! Architecture:
//! - Configuration: command-line flags backed by environment variables
//! - Repositories: HTTP collaborators (Codacy API, pushgateway)
//! - Services: the fetch-then-publish pipeline of one repository
//! - Scheduler: bounded worker pool and completion tracking
//!
//! A run lists the organization's repositories, exports them concurrently and
//! exits once every repository has reached a terminal outcome.

mod config;
mod repository;
mod scheduler;
mod service;

#[cfg(test)]
mod test_support;

use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::{
    Config, DEFAULT_CODACY_URL, DEFAULT_PROVIDER, DEFAULT_PUSHGATEWAY_URL,
    DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_WORKERS,
};
use crate::repository::{
    HttpIssueFetcher, HttpMetricPublisher, HttpRepositoryLister, LoggingMetricPublisher,
    MetricPublisher,
};
use crate::scheduler::Exporter;
use crate::service::StandardPipelineService;
use codacy_client::{CodacyClient, DEFAULT_METRIC_HELP, DEFAULT_METRIC_NAME, PushgatewayClient};

#[derive(Parser)]
#[command(name = "codacy-exporter")]
#[command(about = "Export Codacy issue counts to a Prometheus pushgateway", long_about = None)]
struct Cli {
    /// Codacy account API token
    #[arg(long, env = "CODACY_API_TOKEN", hide_env_values = true)]
    api_token: String,

    /// Organization whose repositories are exported
    #[arg(long, env = "CODACY_ORGANIZATION")]
    organization: String,

    /// Git provider short name (gh, gl, bb)
    #[arg(long, env = "CODACY_PROVIDER", default_value = DEFAULT_PROVIDER)]
    provider: String,

    /// Codacy API base URL
    #[arg(long, env = "CODACY_API_URL", default_value = DEFAULT_CODACY_URL)]
    codacy_url: String,

    /// Pushgateway URL
    #[arg(long, env = "PUSHGATEWAY_URL", default_value = DEFAULT_PUSHGATEWAY_URL)]
    pushgateway_url: String,

    /// Number of repositories processed concurrently
    #[arg(long, env = "EXPORTER_WORKERS", default_value_t = DEFAULT_WORKERS)]
    workers: usize,

    /// Timeout of each HTTP request, in seconds
    #[arg(long, env = "EXPORTER_REQUEST_TIMEOUT", default_value_t = DEFAULT_REQUEST_TIMEOUT_SECS)]
    request_timeout: u64,

    /// Gauge name pushed for every category
    #[arg(long, env = "EXPORTER_METRIC_NAME", default_value = DEFAULT_METRIC_NAME)]
    metric_name: String,

    /// Log samples instead of pushing them
    #[arg(long, env = "EXPORTER_DRY_RUN")]
    dry_run: bool,
}

impl From<Cli> for Config {
    fn from(cli: Cli) -> Self {
        let mut config = Config::new(cli.api_token, cli.organization);
        config.provider = cli.provider;
        config.codacy_url = cli.codacy_url;
        config.pushgateway_url = cli.pushgateway_url;
        config.workers = cli.workers;
        config.request_timeout = Duration::from_secs(cli.request_timeout);
        config.metric_name = cli.metric_name;
        config.dry_run = cli.dry_run;
        config
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Local settings file, if any, before clap reads the environment
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "codacy_exporter=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Codacy exporter");

    let config: Config = Cli::parse().into();
    config.validate()?;
    info!(
        "Loaded configuration: organization={}, codacy_url={}, pushgateway_url={}, workers={}",
        config.organization, config.codacy_url, config.pushgateway_url, config.workers
    );

    let exporter = build_exporter(&config)?;

    match exporter.run().await {
        Ok(summary) => {
            info!(
                "Export finished: {} repositories, {} succeeded, {} failed",
                summary.expected,
                summary.succeeded(),
                summary.failed()
            );
            Ok(())
        }
        Err(e) => {
            error!("Export aborted: {:#}", e);
            Err(e)
        }
    }
}

/// Builds the collaborators and the exporter from the configuration
fn build_exporter(config: &Config) -> Result<Exporter> {
    let http = reqwest::Client::builder()
        .timeout(config.request_timeout)
        .build()
        .context("Failed to build HTTP client")?;

    let codacy = CodacyClient::with_client(
        config.codacy_url.clone(),
        config.provider.clone(),
        config.organization.clone(),
        config.api_token.clone(),
        http.clone(),
    );

    let publisher: Arc<dyn MetricPublisher> = if config.dry_run {
        info!("Dry run: samples are logged, nothing is pushed");
        Arc::new(LoggingMetricPublisher::new(config.metric_name.clone()))
    } else {
        let pushgateway = PushgatewayClient::with_client(config.pushgateway_url.clone(), http)
            .with_metric(config.metric_name.clone(), DEFAULT_METRIC_HELP);
        info!(
            "Pushing {} to {}",
            pushgateway.metric_name(),
            pushgateway.base_url()
        );
        Arc::new(HttpMetricPublisher::new(pushgateway))
    };

    let lister = Arc::new(HttpRepositoryLister::new(codacy.clone()));
    let fetcher = Arc::new(HttpIssueFetcher::new(codacy));
    let pipeline = Arc::new(StandardPipelineService::new(fetcher, publisher));

    Ok(Exporter::new(lister, pipeline, config.workers))
}
