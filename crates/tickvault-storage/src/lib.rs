//! # tickvault-storage
//!
//! Storage layer for tickvault datasets.
//!
//! This crate provides:
//! - The [`StorageBackend`] contract the engine is written against: an
//!   ordered, randomly addressable sequence of fixed-width records
//! - [`MemoryBackend`], a `Vec`-backed implementation
//! - [`FileBackend`], a single-file implementation with a checksummed header
//! - [`Container`], which maps instrument paths and data paths to files

#![warn(missing_docs)]
#![warn(clippy::all)]

mod backend;
mod container;
mod error;
mod memory;

/// Fixed-width dataset files.
pub mod file;

pub use backend::{check_range, StorageBackend};
pub use container::{normalize_instrument_path, Container, DatasetLocation};
pub use error::{StorageError, StorageResult};
pub use file::{FileBackend, FileHeader, OpenOptions};
pub use memory::MemoryBackend;
