//! Type definitions for tickvault.
//!
//! This module contains the record types stored in datasets and the
//! identifiers the container uses to address them.

mod kind;
mod policy;
mod record;
pub mod ticks;

pub use kind::{DataKind, DataPath, Periodicity, RecordKind};
pub use policy::DuplicateTimeTicks;
pub use record::{Keyed, Ohlcv, Quote, Record, Scalar, Trade};
