//! Core domain types
//!
//! These types are shared between the HTTP client (which produces them from
//! API responses) and the exporter (which schedules and reports on them).

pub mod issues;
pub mod job;
pub mod repository;
