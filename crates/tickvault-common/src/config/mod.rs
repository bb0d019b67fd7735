//! Configuration for tickvault.
//!
//! This module contains the dataset and store configuration structures.

mod store;

pub use store::{ConfigError, DatasetConfig, StoreConfig};
