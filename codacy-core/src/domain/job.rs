//! Job domain types

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::domain::repository::RepositoryId;

/// Lifecycle of a single repository job
///
/// `Created -> Fetching -> FetchFailed` or
/// `Created -> Fetching -> Fetched -> Publishing -> Published`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobState {
    Created,
    Fetching,
    FetchFailed,
    Fetched,
    Publishing,
    Published,
}

impl JobState {
    pub fn is_terminal(self) -> bool {
        matches!(self, JobState::FetchFailed | JobState::Published)
    }

    /// Returns whether moving from `self` to `next` is a legal transition
    pub fn can_transition_to(self, next: JobState) -> bool {
        matches!(
            (self, next),
            (JobState::Created, JobState::Fetching)
                | (JobState::Fetching, JobState::FetchFailed)
                | (JobState::Fetching, JobState::Fetched)
                | (JobState::Fetched, JobState::Publishing)
                | (JobState::Publishing, JobState::Published)
        )
    }
}

/// Terminal result of a job, written exactly once
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobOutcome {
    Success,
    Failure(String),
}

impl JobOutcome {
    pub fn failed(reason: impl Into<String>) -> Self {
        Self::Failure(reason.into())
    }

    pub fn is_success(&self) -> bool {
        matches!(self, JobOutcome::Success)
    }
}

impl fmt::Display for JobOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobOutcome::Success => f.write_str("success"),
            JobOutcome::Failure(reason) => write!(f, "failure: {}", reason),
        }
    }
}

/// Record of a finished job kept by the completion tracker
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobReport {
    pub job_id: Uuid,
    pub repository: RepositoryId,
    pub outcome: JobOutcome,
    pub completed_at: chrono::DateTime<chrono::Utc>,
}
