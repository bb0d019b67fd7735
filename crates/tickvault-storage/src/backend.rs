//! The storage backend contract.

use tickvault_common::Record;

use crate::error::{StorageError, StorageResult};

/// An ordered, randomly addressable sequence of fixed-width records.
///
/// Offsets and counts are in records, not bytes. The backend does not know
/// about ticks ordering; the engine maintains it.
///
/// All segment operations fail with [`StorageError::OutOfBounds`] when the
/// segment does not fit, [`StorageError::Closed`] after [`close`], and
/// mutating operations fail with [`StorageError::ReadOnly`] on read-only
/// backends.
///
/// [`close`]: StorageBackend::close
pub trait StorageBackend<R: Record>: Send {
    /// Returns the number of stored records.
    fn len(&self) -> StorageResult<u64>;

    /// Returns true if no records are stored.
    fn is_empty(&self) -> StorageResult<bool> {
        Ok(self.len()? == 0)
    }

    /// Reads `count` records starting at `offset`.
    fn read_segment(&self, offset: u64, count: u64) -> StorageResult<Vec<R>>;

    /// Overwrites records in place starting at `offset`.
    fn write_segment(&mut self, offset: u64, records: &[R]) -> StorageResult<()>;

    /// Inserts records at `offset`, shifting the tail right.
    ///
    /// `offset == len` appends.
    fn insert_segment(&mut self, offset: u64, records: &[R]) -> StorageResult<()>;

    /// Removes `count` records starting at `offset`, shifting the tail left.
    fn delete_segment(&mut self, offset: u64, count: u64) -> StorageResult<()>;

    /// Persists pending changes.
    fn flush(&mut self) -> StorageResult<()>;

    /// Flushes and releases the backend. Later calls fail with `Closed`.
    fn close(&mut self) -> StorageResult<()>;

    /// Returns true if mutating calls are rejected.
    fn is_read_only(&self) -> bool;
}

/// Checks that `[offset, offset + count)` lies within `[0, len)`.
pub fn check_range(offset: u64, count: u64, len: u64) -> StorageResult<()> {
    match offset.checked_add(count) {
        Some(end) if end <= len => Ok(()),
        _ => Err(StorageError::out_of_bounds(offset, count, len)),
    }
}

impl<R: Record, B: StorageBackend<R> + ?Sized> StorageBackend<R> for Box<B> {
    fn len(&self) -> StorageResult<u64> {
        (**self).len()
    }

    fn read_segment(&self, offset: u64, count: u64) -> StorageResult<Vec<R>> {
        (**self).read_segment(offset, count)
    }

    fn write_segment(&mut self, offset: u64, records: &[R]) -> StorageResult<()> {
        (**self).write_segment(offset, records)
    }

    fn insert_segment(&mut self, offset: u64, records: &[R]) -> StorageResult<()> {
        (**self).insert_segment(offset, records)
    }

    fn delete_segment(&mut self, offset: u64, count: u64) -> StorageResult<()> {
        (**self).delete_segment(offset, count)
    }

    fn flush(&mut self) -> StorageResult<()> {
        (**self).flush()
    }

    fn close(&mut self) -> StorageResult<()> {
        (**self).close()
    }

    fn is_read_only(&self) -> bool {
        (**self).is_read_only()
    }
}
