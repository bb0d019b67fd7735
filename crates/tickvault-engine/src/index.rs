//! Binary search over a sorted backend.
//!
//! Searches probe the backend one record at a time while the candidate window
//! is larger than the read buffer, then read the remaining window in one
//! segment and finish in memory.

use std::marker::PhantomData;

use tickvault_common::Record;
use tickvault_storage::{StorageBackend, StorageError};

use crate::error::DatasetResult;

/// Result of a point lookup by ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TicksIndex {
    /// Position of the last record with ticks at or before the target.
    ///
    /// 0 when the target precedes every record (or the dataset is empty).
    pub index: u64,
    /// True if the record at `index` has exactly the target ticks.
    pub exact: bool,
}

/// Result of resolving an inclusive tick range to an index span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TicksIndexRange {
    /// First index inside the range.
    pub index_from: u64,
    /// Last index inside the range (inclusive).
    pub index_to: u64,
    /// True if a record has exactly the lower bound ticks.
    pub match_from: bool,
    /// True if a record has exactly the upper bound ticks.
    pub match_to: bool,
    /// Number of records inside the range.
    pub len: u64,
}

impl TicksIndexRange {
    /// An empty span positioned at `index`.
    #[must_use]
    pub fn empty_at(index: u64) -> Self {
        Self {
            index_from: index,
            index_to: index,
            ..Self::default()
        }
    }

    /// Returns true if no record falls inside the range.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// A contiguous run of record positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    /// First position.
    pub start: u64,
    /// Number of positions.
    pub len: u64,
}

impl Span {
    /// Creates a span.
    #[must_use]
    pub const fn new(start: u64, len: u64) -> Self {
        Self { start, len }
    }

    /// The empty span.
    pub const EMPTY: Self = Self::new(0, 0);

    /// Returns true if the span covers nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// One past the last position.
    #[must_use]
    pub const fn end(&self) -> u64 {
        self.start + self.len
    }
}

impl From<TicksIndexRange> for Span {
    fn from(range: TicksIndexRange) -> Self {
        if range.is_empty() {
            Self::EMPTY
        } else {
            Self::new(range.index_from, range.len)
        }
    }
}

/// Binary search over the first `count` records of a backend.
pub struct Searcher<'a, R, B: ?Sized> {
    backend: &'a B,
    count: u64,
    window: u64,
    _marker: PhantomData<fn() -> R>,
}

impl<'a, R: Record, B: StorageBackend<R> + ?Sized> Searcher<'a, R, B> {
    /// Creates a searcher that reads at most `window_records` records at once.
    pub fn new(backend: &'a B, count: u64, window_records: u64) -> Self {
        Self {
            backend,
            count,
            window: window_records.max(1),
            _marker: PhantomData,
        }
    }

    /// Returns the number of searched records.
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Reads the record at `index`.
    pub fn record_at(&self, index: u64) -> DatasetResult<R> {
        self.backend
            .read_segment(index, 1)?
            .into_iter()
            .next()
            .ok_or_else(|| StorageError::out_of_bounds(index, 1, self.count).into())
    }

    /// Returns the first index in `[lo, hi)` whose record fails `pred`.
    ///
    /// `pred` must hold for a prefix of the range and fail for the rest.
    pub fn partition_point(
        &self,
        mut lo: u64,
        mut hi: u64,
        pred: impl Fn(&R) -> bool,
    ) -> DatasetResult<u64> {
        while hi - lo > self.window {
            let mid = lo + (hi - lo) / 2;
            if pred(&self.record_at(mid)?) {
                lo = mid + 1;
            } else {
                hi = mid;
            }
        }
        if lo == hi {
            return Ok(lo);
        }
        let window = self.backend.read_segment(lo, hi - lo)?;
        Ok(lo + window.partition_point(|r| pred(r)) as u64)
    }

    /// First index in `[lo, count)` with ticks at or after `ticks`.
    pub fn lower_bound_from(&self, lo: u64, ticks: i64) -> DatasetResult<u64> {
        self.partition_point(lo, self.count, |r| r.ticks() < ticks)
    }

    /// First index with ticks at or after `ticks`; `count` if none.
    pub fn lower_bound(&self, ticks: i64) -> DatasetResult<u64> {
        self.lower_bound_from(0, ticks)
    }

    /// First index with ticks strictly after `ticks`; `count` if none.
    pub fn upper_bound(&self, ticks: i64) -> DatasetResult<u64> {
        self.partition_point(0, self.count, |r| r.ticks() <= ticks)
    }

    /// Locates the last record at or before `ticks`.
    ///
    /// `exact` is true only when that record has exactly `ticks`. A target
    /// past the last record resolves to `(count - 1, false)`, and one before
    /// the first record to `(0, false)`.
    pub fn ticks_index(&self, ticks: i64) -> DatasetResult<TicksIndex> {
        let upper = self.upper_bound(ticks)?;
        if upper == 0 {
            return Ok(TicksIndex::default());
        }
        let index = upper - 1;
        Ok(TicksIndex {
            index,
            exact: self.record_at(index)?.ticks() == ticks,
        })
    }

    /// Resolves the inclusive range `[from, to]` to an index span.
    ///
    /// An empty span is positioned at the insertion point of `from`, clamped
    /// to the last record.
    pub fn ticks_index_range(&self, from: i64, to: i64) -> DatasetResult<TicksIndexRange> {
        if self.count == 0 {
            return Ok(TicksIndexRange::default());
        }

        let lower = self.lower_bound(from)?;
        let upper = if from > to {
            lower
        } else {
            self.partition_point(lower, self.count, |r| r.ticks() <= to)?
        };
        if upper <= lower {
            return Ok(TicksIndexRange::empty_at(lower.min(self.count - 1)));
        }

        let first = self.record_at(lower)?;
        let last = if upper - 1 == lower {
            first
        } else {
            self.record_at(upper - 1)?
        };
        Ok(TicksIndexRange {
            index_from: lower,
            index_to: upper - 1,
            match_from: first.ticks() == from,
            match_to: last.ticks() == to,
            len: upper - lower,
        })
    }
}
