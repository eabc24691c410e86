//! Codacy Core
//!
//! Core types and abstractions for the Codacy issue exporter.
//!
//! This crate contains:
//! - Domain types: repositories, issue counts and job outcomes
//! - DTOs: wire shapes of the Codacy analysis API

pub mod domain;
pub mod dto;
