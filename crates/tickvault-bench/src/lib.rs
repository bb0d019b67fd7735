//! tickvault Performance Benchmarks
//!
//! This crate contains benchmarks for the dataset engine:
//! - Appending and interleaving adds, in memory and on disk
//! - Tick and index range fetches
//! - Range deletes
//!
//! Run benchmarks with:
//! ```bash
//! cargo bench -p tickvault-bench
//! ```

pub mod utils;
