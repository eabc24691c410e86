//! Export run
//!
//! Wires one run end to end: list the repositories, size the completion
//! tracker, submit one job per repository and wait until every job is
//! terminal.

use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{debug, error, info};

use crate::repository::RepositoryLister;
use crate::scheduler::dispatcher::Dispatcher;
use crate::scheduler::job::Job;
use crate::scheduler::tracker::{CompletionSummary, CompletionTracker};
use crate::service::PipelineService;

/// Drives a single export run
pub struct Exporter {
    lister: Arc<dyn RepositoryLister>,
    pipeline: Arc<dyn PipelineService>,
    workers: usize,
}

impl Exporter {
    /// Creates an exporter running at most `workers` jobs at once
    pub fn new(
        lister: Arc<dyn RepositoryLister>,
        pipeline: Arc<dyn PipelineService>,
        workers: usize,
    ) -> Self {
        Self {
            lister,
            pipeline,
            workers,
        }
    }

    /// Runs the export and returns once every job has an outcome
    ///
    /// Only a listing failure is returned as an error; per-job failures are
    /// part of the summary.
    pub async fn run(&self) -> Result<CompletionSummary> {
        let repositories = self
            .lister
            .list_repositories()
            .await
            .context("Failed to list repositories")?;

        info!("Found {} repositories to export", repositories.len());

        let tracker = CompletionTracker::new(repositories.len());
        let dispatcher = Dispatcher::new("codacy-exporter", self.workers);
        debug!(
            "Dispatching {} jobs over {} worker(s)",
            repositories.len(),
            dispatcher.workers()
        );

        for repository in repositories {
            let completion = tracker.register(repository)?;
            dispatcher.submit(Job::new(Arc::clone(&self.pipeline), completion));
        }

        let summary = tracker.wait().await;
        debug_assert!(tracker.is_complete());
        dispatcher.shutdown().await;

        for report in summary.failures() {
            error!("Export of {} failed: {}", report.repository, report.outcome);
        }
        info!(
            "All {} jobs finished: {} succeeded, {} failed",
            summary.recorded(),
            summary.succeeded(),
            summary.failed()
        );

        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::MockRepositoryLister;
    use crate::service::StandardPipelineService;
    use crate::test_support::{RecordingPublisher, StaticFetcher};
    use codacy_core::domain::job::JobOutcome;
    use codacy_core::domain::repository::RepositoryId;

    fn lister(names: &'static [&'static str]) -> Arc<MockRepositoryLister> {
        let mut lister = MockRepositoryLister::new();
        lister
            .expect_list_repositories()
            .times(1)
            .returning(move || Ok(names.iter().map(|n| RepositoryId::new(*n)).collect()));
        Arc::new(lister)
    }

    #[tokio::test]
    async fn test_alpha_published_beta_fetch_timeout() {
        let fetcher = Arc::new(
            StaticFetcher::new()
                .with_counts("alpha", &[("security", 3), ("complexity", 1)])
                .failing("beta", "operation timed out"),
        );
        let publisher = Arc::new(RecordingPublisher::default());
        let pipeline = Arc::new(StandardPipelineService::new(fetcher, publisher.clone()));

        let exporter = Exporter::new(lister(&["alpha", "beta"]), pipeline, 2);
        let summary = exporter.run().await.unwrap();

        assert_eq!(summary.recorded(), 2);
        assert_eq!(summary.outcome_of("alpha"), Some(&JobOutcome::Success));
        assert!(matches!(
            summary.outcome_of("beta"),
            Some(JobOutcome::Failure(_))
        ));

        assert_eq!(publisher.published_for("alpha"), 2);
        assert_eq!(publisher.published_for("beta"), 0);

        let samples = publisher.sorted_samples();
        assert_eq!(samples[0].category, "complexity");
        assert_eq!(samples[0].value, 1);
        assert_eq!(samples[1].category, "security");
        assert_eq!(samples[1].value, 3);
    }

    #[tokio::test]
    async fn test_publish_failure_is_isolated_to_its_category() {
        let fetcher = Arc::new(
            StaticFetcher::new()
                .with_counts("alpha", &[("security", 3), ("complexity", 1)])
                .with_counts("gamma", &[("security", 9)]),
        );
        let publisher = Arc::new(RecordingPublisher::default().rejecting("alpha", "security"));
        let pipeline = Arc::new(StandardPipelineService::new(fetcher, publisher.clone()));

        let exporter = Exporter::new(lister(&["alpha", "gamma"]), pipeline, 1);
        let summary = exporter.run().await.unwrap();

        assert_eq!(summary.succeeded(), 2);
        assert_eq!(publisher.attempted_for("alpha"), 2);
        assert_eq!(publisher.published_for("alpha"), 1);
        assert_eq!(publisher.published_for("gamma"), 1);
    }

    #[tokio::test]
    async fn test_listing_failure_dispatches_nothing() {
        let mut lister = MockRepositoryLister::new();
        lister
            .expect_list_repositories()
            .returning(|| Err(anyhow::anyhow!("connection refused")));

        let fetcher = Arc::new(StaticFetcher::new());
        let publisher = Arc::new(RecordingPublisher::default());
        let pipeline = Arc::new(StandardPipelineService::new(
            fetcher.clone(),
            publisher.clone(),
        ));

        let exporter = Exporter::new(Arc::new(lister), pipeline, 4);
        let err = exporter.run().await.unwrap_err();

        assert!(format!("{:#}", err).contains("connection refused"));
        assert_eq!(fetcher.calls(), 0);
        assert_eq!(publisher.attempts(), 0);
    }

    #[tokio::test]
    async fn test_empty_listing_completes() {
        let fetcher = Arc::new(StaticFetcher::new());
        let publisher = Arc::new(RecordingPublisher::default());
        let pipeline = Arc::new(StandardPipelineService::new(fetcher, publisher));

        let exporter = Exporter::new(lister(&[]), pipeline, 4);
        let summary = exporter.run().await.unwrap();

        assert_eq!(summary.expected, 0);
        assert_eq!(summary.recorded(), 0);
    }
}
