//! # tickvault-test
//!
//! Integration tests for tickvault.
//!
//! This crate contains:
//! - Fixtures: logging setup, temporary containers and record builders
//! - A reference model of a dataset to check the engine against
//! - Seeded workload generators for randomized checks

#![warn(missing_docs)]
#![warn(clippy::all)]

/// Test fixtures and helpers
pub mod fixtures;

/// Reference model of a dataset
pub mod model;

/// Workload generators
pub mod workload;
