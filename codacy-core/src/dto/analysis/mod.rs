//! Codacy analysis API DTOs

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::domain::issues::IssueCategoryCounts;
use crate::domain::repository::RepositoryId;

/// One page of `GET /analysis/organizations/{provider}/{org}/repositories`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositoryListResponse {
    #[serde(default)]
    pub data: Vec<RepositoryWithAnalysis>,
    #[serde(default)]
    pub pagination: Option<Pagination>,
}

impl RepositoryListResponse {
    /// Cursor of the next page, if the service reported one
    pub fn next_cursor(&self) -> Option<&str> {
        self.pagination
            .as_ref()
            .and_then(|p| p.cursor.as_deref())
            .filter(|c| !c.is_empty())
    }

    pub fn repository_ids(&self) -> impl Iterator<Item = RepositoryId> + '_ {
        self.data
            .iter()
            .map(|entry| RepositoryId::new(entry.repository.name.clone()))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositoryWithAnalysis {
    pub repository: RepositorySummary,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositorySummary {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pagination {
    #[serde(default)]
    pub cursor: Option<String>,
    #[serde(default)]
    pub limit: Option<u32>,
    #[serde(default)]
    pub total: Option<u64>,
}

/// Response of `GET .../repositories/{repo}/category-overviews`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryOverviewResponse {
    #[serde(default)]
    pub data: Vec<CategoryOverview>,
}

impl CategoryOverviewResponse {
    /// Category names reported more than once, each listed once
    pub fn duplicate_categories(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        let mut duplicates = Vec::new();
        for overview in &self.data {
            let name = overview.category.category_type.as_str();
            if !seen.insert(name) && !duplicates.contains(&name) {
                duplicates.push(name);
            }
        }
        duplicates
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryOverview {
    pub category: Category,
    pub total_results: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    #[serde(rename = "categoryType")]
    pub category_type: String,
}

/// A category repeated in the response keeps its last count; see
/// [`CategoryOverviewResponse::duplicate_categories`] to detect that case.
impl From<CategoryOverviewResponse> for IssueCategoryCounts {
    fn from(response: CategoryOverviewResponse) -> Self {
        response
            .data
            .into_iter()
            .map(|overview| (overview.category.category_type, overview.total_results))
            .collect()
    }
}
