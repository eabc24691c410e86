//! Completion tracker
//!
//! Counts terminal job outcomes and wakes the controller when the last one
//! lands. The tracker is sized once, when the repository list is known, and
//! hands out exactly that many [`CompletionHandle`]s. A handle records one
//! outcome and is consumed doing so; a handle dropped without recording
//! records a failure, so every job contributes exactly one outcome.

use anyhow::Result;
use codacy_core::domain::job::{JobOutcome, JobReport};
use codacy_core::domain::repository::RepositoryId;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::watch;
use tracing::{debug, warn};
use uuid::Uuid;

/// Shared completion state of one export run
#[derive(Clone)]
pub struct CompletionTracker {
    inner: Arc<TrackerInner>,
}

struct TrackerInner {
    expected: usize,
    issued: AtomicUsize,
    recorded: watch::Sender<usize>,
    reports: Mutex<Vec<JobReport>>,
}

impl TrackerInner {
    fn record(&self, report: JobReport) {
        debug!(
            "Recording outcome of job {} ({}): {}",
            report.job_id, report.repository, report.outcome
        );

        // Report first so a woken waiter always sees it
        self.reports
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(report);
        self.recorded.send_modify(|count| *count += 1);
    }
}

impl CompletionTracker {
    /// Creates a tracker expecting exactly `expected` outcomes
    pub fn new(expected: usize) -> Self {
        let (recorded, _) = watch::channel(0);
        Self {
            inner: Arc::new(TrackerInner {
                expected,
                issued: AtomicUsize::new(0),
                recorded,
                reports: Mutex::new(Vec::with_capacity(expected)),
            }),
        }
    }

    /// Number of outcomes recorded so far
    pub fn recorded(&self) -> usize {
        *self.inner.recorded.borrow()
    }

    pub fn is_complete(&self) -> bool {
        self.recorded() >= self.inner.expected
    }

    /// Hands out the completion handle of a new job
    ///
    /// Fails once `expected` handles have been issued.
    pub fn register(&self, repository: RepositoryId) -> Result<CompletionHandle> {
        let issued = self.inner.issued.fetch_add(1, Ordering::SeqCst);
        if issued >= self.inner.expected {
            self.inner.issued.fetch_sub(1, Ordering::SeqCst);
            anyhow::bail!(
                "tracker sized for {} jobs cannot register {}",
                self.inner.expected,
                repository
            );
        }

        Ok(CompletionHandle {
            job_id: Uuid::new_v4(),
            repository,
            inner: Some(Arc::clone(&self.inner)),
        })
    }

    /// Waits until every expected outcome is recorded
    ///
    /// Resolves immediately for a tracker sized to zero.
    pub async fn wait(&self) -> CompletionSummary {
        let mut receiver = self.inner.recorded.subscribe();
        let expected = self.inner.expected;

        // The sender lives in `inner`, which we hold, so the channel cannot close
        let _ = receiver.wait_for(|count| *count >= expected).await;

        self.summary()
    }

    /// Snapshot of the outcomes recorded so far
    pub fn summary(&self) -> CompletionSummary {
        let reports = self
            .inner
            .reports
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone();

        CompletionSummary {
            expected: self.inner.expected,
            reports,
        }
    }
}

/// Right to record the outcome of one job
pub struct CompletionHandle {
    job_id: Uuid,
    repository: RepositoryId,
    inner: Option<Arc<TrackerInner>>,
}

impl CompletionHandle {
    pub fn job_id(&self) -> Uuid {
        self.job_id
    }

    pub fn repository(&self) -> &RepositoryId {
        &self.repository
    }

    /// Records the terminal outcome of the job
    pub fn record(mut self, outcome: JobOutcome) {
        if let Some(inner) = self.inner.take() {
            inner.record(self.report(outcome));
        }
    }

    fn report(&self, outcome: JobOutcome) -> JobReport {
        JobReport {
            job_id: self.job_id,
            repository: self.repository.clone(),
            outcome,
            completed_at: chrono::Utc::now(),
        }
    }
}

impl Drop for CompletionHandle {
    fn drop(&mut self) {
        if let Some(inner) = self.inner.take() {
            warn!(
                "Job {} ({}) ended without an outcome, recording failure",
                self.job_id, self.repository
            );
            inner.record(self.report(JobOutcome::failed(
                "job ended before reaching a terminal state",
            )));
        }
    }
}

/// Outcomes of a run
#[derive(Debug, Clone)]
pub struct CompletionSummary {
    pub expected: usize,
    pub reports: Vec<JobReport>,
}

impl CompletionSummary {
    pub fn recorded(&self) -> usize {
        self.reports.len()
    }

    pub fn succeeded(&self) -> usize {
        self.reports
            .iter()
            .filter(|r| r.outcome.is_success())
            .count()
    }

    pub fn failed(&self) -> usize {
        self.recorded() - self.succeeded()
    }

    pub fn failures(&self) -> impl Iterator<Item = &JobReport> {
        self.reports.iter().filter(|r| !r.outcome.is_success())
    }
}

#[cfg(test)]
impl CompletionSummary {
    /// Outcome recorded for `repository`, if any
    pub fn outcome_of(&self, repository: &str) -> Option<&JobOutcome> {
        self.reports
            .iter()
            .find(|r| r.repository.as_str() == repository)
            .map(|r| &r.outcome)
    }
}
