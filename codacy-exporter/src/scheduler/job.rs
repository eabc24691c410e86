//! Repository job
//!
//! A job binds one repository to the pipeline and to the handle that
//! records its outcome. It is owned by whichever worker executes it.

use codacy_core::domain::job::JobOutcome;
use codacy_core::domain::repository::RepositoryId;
use std::sync::Arc;
use tracing::{debug, error};
use uuid::Uuid;

use crate::scheduler::tracker::CompletionHandle;
use crate::service::PipelineService;

/// Unit of work for one repository
pub struct Job {
    pub id: Uuid,
    pub repository: RepositoryId,
    pipeline: Arc<dyn PipelineService>,
    completion: CompletionHandle,
}

impl Job {
    /// Creates the job tracked by `completion`
    pub fn new(pipeline: Arc<dyn PipelineService>, completion: CompletionHandle) -> Self {
        Self {
            id: completion.job_id(),
            repository: completion.repository().clone(),
            pipeline,
            completion,
        }
    }

    /// Runs the pipeline and records its outcome
    ///
    /// The pipeline runs in its own task so a panic is contained and turned
    /// into a failed outcome instead of unwinding through the worker.
    pub async fn execute(self) -> JobOutcome {
        let Job {
            id,
            repository,
            pipeline,
            completion,
        } = self;

        debug!("Starting job {} for {}", id, repository);

        let task_repository = repository.clone();
        let task = tokio::spawn(async move { pipeline.run(id, &task_repository).await });

        let outcome = match task.await {
            Ok(outcome) => outcome,
            Err(e) if e.is_panic() => {
                error!("Job {} for {} panicked", id, repository);
                JobOutcome::failed("job panicked")
            }
            Err(e) => {
                error!("Job {} for {} was aborted: {}", id, repository, e);
                JobOutcome::failed(format!("job aborted: {}", e))
            }
        };

        completion.record(outcome.clone());
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::tracker::CompletionTracker;
    use crate::test_support::FakePipeline;

    #[tokio::test]
    async fn test_execute_records_pipeline_outcome() {
        let tracker = CompletionTracker::new(2);
        let pipeline = Arc::new(FakePipeline::new().failing("beta"));

        let alpha = Job::new(
            pipeline.clone(),
            tracker.register(RepositoryId::new("alpha")).unwrap(),
        );
        let beta = Job::new(
            pipeline.clone(),
            tracker.register(RepositoryId::new("beta")).unwrap(),
        );

        assert_eq!(alpha.execute().await, JobOutcome::Success);
        assert!(matches!(beta.execute().await, JobOutcome::Failure(_)));

        let summary = tracker.summary();
        assert_eq!(summary.recorded(), 2);
        assert_eq!(summary.outcome_of("alpha"), Some(&JobOutcome::Success));
    }

    #[tokio::test]
    async fn test_execute_contains_panic() {
        let tracker = CompletionTracker::new(1);
        let pipeline = Arc::new(FakePipeline::new().panicking("boom"));

        let job = Job::new(pipeline, tracker.register(RepositoryId::new("boom")).unwrap());
        let outcome = job.execute().await;

        assert_eq!(outcome, JobOutcome::failed("job panicked"));
        assert!(tracker.is_complete());
    }
}
