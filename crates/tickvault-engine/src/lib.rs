//! # tickvault-engine
//!
//! The sorted-sequence engine behind tickvault datasets.
//!
//! A dataset is a strictly ascending, duplicate-free sequence of records
//! keyed by ticks, stored in a [`StorageBackend`]. This crate provides:
//!
//! - **Spreader**: [`spread_duplicate_time_ticks`] makes a tied batch strictly
//!   ascending before it is added
//! - **Sorted index**: binary search from ticks to positions and from tick
//!   ranges to index spans
//! - **Merge-insert**: reconciles a batch with the stored records under a
//!   [`DuplicateTimeTicks`] policy
//! - **Range query** and **range delete** by ticks or by index
//! - **[`Dataset`]**: the handle tying these to a backend
//!
//! ## Example
//!
//! ```rust
//! use tickvault_common::{DuplicateTimeTicks, Scalar};
//! use tickvault_engine::{Dataset, ScalarDataset};
//! use tickvault_storage::MemoryBackend;
//!
//! let mut dataset: ScalarDataset<MemoryBackend<Scalar>> = Dataset::in_memory();
//! dataset
//!     .add(&[Scalar::new(2, 2.1), Scalar::new(4, 4.1), Scalar::new(6, 6.1)], DuplicateTimeTicks::Fail)
//!     .unwrap();
//!
//! let summary = dataset
//!     .add(&[Scalar::new(1, 1.2), Scalar::new(2, 2.2)], DuplicateTimeTicks::Update)
//!     .unwrap();
//! assert_eq!((summary.inserted, summary.updated), (1, 1));
//!
//! assert_eq!(dataset.delete_index_range(1, 2).unwrap(), 2);
//! assert_eq!(dataset.count(), 2);
//! ```
//!
//! [`StorageBackend`]: tickvault_storage::StorageBackend
//! [`DuplicateTimeTicks`]: tickvault_common::DuplicateTimeTicks

#![warn(missing_docs)]
#![warn(clippy::all)]

mod dataset;
mod error;
mod spreader;

pub mod delete;
pub mod index;
pub mod merge;
pub mod query;

pub use dataset::{Dataset, DatasetMetadata};
pub use error::{DatasetError, DatasetResult};
pub use index::{Searcher, Span, TicksIndex, TicksIndexRange};
pub use merge::AddSummary;
pub use spreader::spread_duplicate_time_ticks;

use tickvault_common::{Ohlcv, Quote, Scalar, Trade};
use tickvault_storage::FileBackend;

/// A dataset of trades, file-backed by default.
pub type TradeDataset<B = FileBackend<Trade>> = Dataset<Trade, B>;

/// A dataset of quotes, file-backed by default.
pub type QuoteDataset<B = FileBackend<Quote>> = Dataset<Quote, B>;

/// A dataset of OHLCV bars, file-backed by default.
pub type OhlcvDataset<B = FileBackend<Ohlcv>> = Dataset<Ohlcv, B>;

/// A dataset of scalar values, file-backed by default.
pub type ScalarDataset<B = FileBackend<Scalar>> = Dataset<Scalar, B>;
