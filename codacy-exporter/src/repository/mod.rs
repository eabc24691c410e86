//! Repository layer
//!
//! Thin, trait-based wrappers over the remote collaborators: the
//! repository lister, the issue fetcher and the metric publisher. They
//! carry no business logic and exist so the pipeline and scheduler can be
//! tested without a network.

mod issues;
mod metrics;
mod repositories;

// Re-export traits
pub use issues::IssueFetcher;
pub use metrics::MetricPublisher;
pub use repositories::RepositoryLister;

// Re-export implementations
pub use issues::HttpIssueFetcher;
pub use metrics::{HttpMetricPublisher, LoggingMetricPublisher};
pub use repositories::HttpRepositoryLister;

#[cfg(test)]
pub use issues::MockIssueFetcher;
#[cfg(test)]
pub use metrics::MockMetricPublisher;
#[cfg(test)]
pub use repositories::MockRepositoryLister;
