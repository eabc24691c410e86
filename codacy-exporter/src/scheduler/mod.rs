//! Scheduler layer
//!
//! Fans repository jobs out over a bounded worker pool and tracks their
//! completion:
//! - `Dispatcher`: fixed-size pool draining a shared job queue
//! - `Job`: one repository bound to the pipeline and its completion handle
//! - `CompletionTracker`: counts terminal outcomes and wakes the controller
//! - `Exporter`: wires a whole run together

pub mod dispatcher;
pub mod exporter;
pub mod job;
pub mod tracker;

pub use exporter::Exporter;
