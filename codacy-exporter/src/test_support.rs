//! Test doubles shared by the service and scheduler tests

use anyhow::Result;
use async_trait::async_trait;
use codacy_core::domain::issues::{IssueCategoryCounts, IssueSample};
use codacy_core::domain::job::JobOutcome;
use codacy_core::domain::repository::RepositoryId;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use uuid::Uuid;

use crate::repository::{IssueFetcher, MetricPublisher};
use crate::service::PipelineService;

/// Pipeline that only sleeps, counting how many runs overlap
#[derive(Default)]
pub struct FakePipeline {
    delay: Duration,
    failing: HashSet<String>,
    panicking: HashSet<String>,
    runs: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl FakePipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn failing(mut self, repository: &str) -> Self {
        self.failing.insert(repository.to_string());
        self
    }

    pub fn panicking(mut self, repository: &str) -> Self {
        self.panicking.insert(repository.to_string());
        self
    }

    pub fn runs(&self) -> usize {
        self.runs.load(Ordering::SeqCst)
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PipelineService for FakePipeline {
    async fn run(&self, _job_id: Uuid, repository: &RepositoryId) -> JobOutcome {
        self.runs.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.panicking.contains(repository.as_str()) {
            panic!("pipeline exploded for {}", repository);
        }
        if self.failing.contains(repository.as_str()) {
            return JobOutcome::failed(format!("fetch failed for {}", repository));
        }
        JobOutcome::Success
    }
}

/// Fetcher answering from a fixed table; unknown repositories fail
#[derive(Default)]
pub struct StaticFetcher {
    responses: HashMap<String, std::result::Result<IssueCategoryCounts, String>>,
    calls: AtomicUsize,
}

impl StaticFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_counts(mut self, repository: &str, counts: &[(&str, u64)]) -> Self {
        let counts: IssueCategoryCounts = counts
            .iter()
            .map(|(category, count)| (category.to_string(), *count))
            .collect();
        self.responses.insert(repository.to_string(), Ok(counts));
        self
    }

    pub fn failing(mut self, repository: &str, reason: &str) -> Self {
        self.responses
            .insert(repository.to_string(), Err(reason.to_string()));
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl IssueFetcher for StaticFetcher {
    async fn fetch_issues(&self, repository: &RepositoryId) -> Result<IssueCategoryCounts> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.responses.get(repository.as_str()) {
            Some(Ok(counts)) => Ok(counts.clone()),
            Some(Err(reason)) => Err(anyhow::anyhow!("{}", reason)),
            None => Err(anyhow::anyhow!("unknown repository {}", repository)),
        }
    }
}

/// Publisher that remembers every sample it accepted
#[derive(Default)]
pub struct RecordingPublisher {
    rejected: HashSet<(String, String)>,
    attempts: Mutex<Vec<IssueSample>>,
    published: Mutex<Vec<IssueSample>>,
}

impl RecordingPublisher {
    /// Rejects pushes of `category` for `repository`
    pub fn rejecting(mut self, repository: &str, category: &str) -> Self {
        self.rejected
            .insert((repository.to_string(), category.to_string()));
        self
    }

    pub fn attempts(&self) -> usize {
        self.attempts.lock().unwrap().len()
    }

    pub fn attempted_for(&self, repository: &str) -> usize {
        self.attempts
            .lock()
            .unwrap()
            .iter()
            .filter(|s| s.repository.as_str() == repository)
            .count()
    }

    pub fn published_for(&self, repository: &str) -> usize {
        self.published
            .lock()
            .unwrap()
            .iter()
            .filter(|s| s.repository.as_str() == repository)
            .count()
    }

    /// Accepted samples ordered by repository, then category
    pub fn sorted_samples(&self) -> Vec<IssueSample> {
        let mut samples = self.published.lock().unwrap().clone();
        samples.sort_by(|a, b| {
            (a.repository.as_str(), a.category.as_str())
                .cmp(&(b.repository.as_str(), b.category.as_str()))
        });
        samples
    }
}

#[async_trait]
impl MetricPublisher for RecordingPublisher {
    async fn publish(&self, sample: &IssueSample) -> Result<()> {
        self.attempts.lock().unwrap().push(sample.clone());

        let key = (sample.repository.to_string(), sample.category.clone());
        if self.rejected.contains(&key) {
            anyhow::bail!("relay rejected {} of {}", sample.category, sample.repository);
        }

        self.published.lock().unwrap().push(sample.clone());
        Ok(())
    }
}
