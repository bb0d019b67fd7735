//! # tickvault-common
//!
//! Common types, errors, and configuration for tickvault.
//!
//! This crate provides the foundational types used across all tickvault
//! components. It includes:
//!
//! - **Types**: tick conversions, the four record kinds (`Trade`, `Quote`,
//!   `Ohlcv`, `Scalar`), the `Keyed`/`Record` abstractions and their
//!   fixed-width codec, data kinds, periodicities and data-path codes
//! - **Errors**: stable `ErrorCode`s and the `CodecError` type
//! - **Config**: dataset and store configuration structures
//! - **Constants**: file-format constants and defaults
//!
//! ## Example
//!
//! ```rust
//! use tickvault_common::types::{DataKind, DataPath, Periodicity, Scalar, Keyed};
//!
//! let path = DataPath::new(DataKind::Ohlcv, Periodicity::Minute(3)).unwrap();
//! assert_eq!(path.to_string(), "c_m03");
//!
//! let value = Scalar::new(1000, 1.5).with_ticks(1001);
//! assert_eq!(value.ticks(), 1001);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod constants;
pub mod error;
pub mod types;

pub use config::{ConfigError, DatasetConfig, StoreConfig};
pub use constants::*;
pub use error::{CodecError, CodecResult, ErrorCode};
pub use types::{
    DataKind, DataPath, DuplicateTimeTicks, Keyed, Ohlcv, Periodicity, Quote, Record,
    RecordKind, Scalar, Trade,
};
