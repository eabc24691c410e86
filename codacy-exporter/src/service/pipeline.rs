//! Pipeline service
//!
//! Runs the fetch-then-publish pipeline for one repository:
//! - Fetch the category counts; on failure the job ends and nothing is pushed
//! - Push one sample per category; a failed push is logged and the remaining
//!   categories are still pushed
//!
//! Every path ends in exactly one `JobOutcome`.

use async_trait::async_trait;
use codacy_core::domain::job::{JobOutcome, JobState};
use codacy_core::domain::repository::RepositoryId;
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::repository::{IssueFetcher, MetricPublisher};

/// Service trait for running one repository job
#[async_trait]
pub trait PipelineService: Send + Sync {
    /// Runs the pipeline for `repository` and returns its terminal outcome
    ///
    /// # Arguments
    /// * `job_id` - Identifier used to correlate log lines of this job
    /// * `repository` - The repository to export
    async fn run(&self, job_id: Uuid, repository: &RepositoryId) -> JobOutcome;
}

/// Standard implementation of PipelineService
pub struct StandardPipelineService {
    fetcher: Arc<dyn IssueFetcher>,
    publisher: Arc<dyn MetricPublisher>,
}

impl StandardPipelineService {
    /// Creates a new pipeline service over the given collaborators
    pub fn new(fetcher: Arc<dyn IssueFetcher>, publisher: Arc<dyn MetricPublisher>) -> Self {
        Self { fetcher, publisher }
    }
}

/// Moves `state` to `next`, logging the transition
fn advance(state: &mut JobState, next: JobState, job_id: Uuid, repository: &RepositoryId) {
    debug_assert!(
        state.can_transition_to(next),
        "illegal job transition {:?} -> {:?}",
        state,
        next
    );
    debug!("Job {} ({}): {:?} -> {:?}", job_id, repository, state, next);
    *state = next;
}

#[async_trait]
impl PipelineService for StandardPipelineService {
    async fn run(&self, job_id: Uuid, repository: &RepositoryId) -> JobOutcome {
        let mut state = JobState::Created;

        advance(&mut state, JobState::Fetching, job_id, repository);
        let counts = match self.fetcher.fetch_issues(repository).await {
            Ok(counts) => counts,
            Err(e) => {
                error!("Failed to fetch issues for {}: {:#}", repository, e);
                advance(&mut state, JobState::FetchFailed, job_id, repository);
                debug_assert!(state.is_terminal());
                return JobOutcome::failed(format!("fetch failed: {:#}", e));
            }
        };
        advance(&mut state, JobState::Fetched, job_id, repository);

        advance(&mut state, JobState::Publishing, job_id, repository);
        let samples = counts.samples(repository);
        let mut failed = 0;

        for sample in &samples {
            if let Err(e) = self.publisher.publish(sample).await {
                failed += 1;
                warn!(
                    "Could not push {} of {} to pushgateway: {:#}",
                    sample.category, repository, e
                );
            }
        }
        advance(&mut state, JobState::Published, job_id, repository);
        debug_assert!(state.is_terminal());

        info!(
            "Published {}/{} categories for {}",
            samples.len() - failed,
            samples.len(),
            repository
        );

        JobOutcome::Success
    }
}
