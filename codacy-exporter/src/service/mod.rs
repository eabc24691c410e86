//! Service layer
//!
//! Services contain the business logic of a job. They orchestrate the
//! repository layer and are trait-based so the scheduler can run any
//! implementation.

mod pipeline;

// Re-export traits
pub use pipeline::PipelineService;

// Re-export implementations
pub use pipeline::StandardPipelineService;
