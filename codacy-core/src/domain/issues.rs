//! Issue count domain types

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::domain::repository::RepositoryId;

/// Issue counts of one repository, keyed by category name
///
/// Produced fresh for every run. Iteration order is unspecified.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IssueCategoryCounts(HashMap<String, u64>);

impl IssueCategoryCounts {
    pub fn new() -> Self {
        Self(HashMap::new())
    }

    /// Sets the count for a category, replacing any previous value
    pub fn insert(&mut self, category: impl Into<String>, count: u64) {
        self.0.insert(category.into(), count);
    }

    pub fn get(&self, category: &str) -> Option<u64> {
        self.0.get(category).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Expands the counts into one sample per category for `repository`
    pub fn samples(&self, repository: &RepositoryId) -> Vec<IssueSample> {
        self.iter()
            .map(|(category, count)| IssueSample {
                repository: repository.clone(),
                category: category.to_string(),
                value: count,
            })
            .collect()
    }
}

impl FromIterator<(String, u64)> for IssueCategoryCounts {
    fn from_iter<I: IntoIterator<Item = (String, u64)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// A single metric sample: one category of one repository
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueSample {
    pub repository: RepositoryId,
    pub category: String,
    pub value: u64,
}
