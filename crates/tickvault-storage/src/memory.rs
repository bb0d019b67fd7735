//! In-memory storage backend.

use tickvault_common::Record;
use tracing::trace;

use crate::backend::{check_range, StorageBackend};
use crate::error::{StorageError, StorageResult};

/// A `Vec`-backed storage backend.
///
/// # Example
///
/// ```rust
/// use tickvault_common::Scalar;
/// use tickvault_storage::{MemoryBackend, StorageBackend};
///
/// let mut backend = MemoryBackend::new();
/// backend.insert_segment(0, &[Scalar::new(1, 1.0), Scalar::new(3, 3.0)]).unwrap();
/// backend.insert_segment(1, &[Scalar::new(2, 2.0)]).unwrap();
/// assert_eq!(backend.len().unwrap(), 3);
/// assert_eq!(backend.read_segment(1, 1).unwrap(), vec![Scalar::new(2, 2.0)]);
/// ```
#[derive(Debug, Clone)]
pub struct MemoryBackend<R> {
    records: Vec<R>,
    read_only: bool,
    closed: bool,
}

impl<R: Record> MemoryBackend<R> {
    /// Creates an empty, writable backend.
    #[must_use]
    pub fn new() -> Self {
        Self::with_records(Vec::new())
    }

    /// Creates a writable backend seeded with `records`.
    ///
    /// The records are stored as given; the caller is responsible for their
    /// ordering.
    #[must_use]
    pub fn with_records(records: Vec<R>) -> Self {
        Self {
            records,
            read_only: false,
            closed: false,
        }
    }

    /// Creates a read-only backend over `records`.
    #[must_use]
    pub fn read_only(records: Vec<R>) -> Self {
        Self {
            records,
            read_only: true,
            closed: false,
        }
    }

    /// Returns the stored records.
    #[must_use]
    pub fn records(&self) -> &[R] {
        &self.records
    }

    /// Consumes the backend and returns its records.
    #[must_use]
    pub fn into_records(self) -> Vec<R> {
        self.records
    }

    fn check_open(&self) -> StorageResult<()> {
        if self.closed {
            Err(StorageError::Closed)
        } else {
            Ok(())
        }
    }

    fn check_writable(&self) -> StorageResult<()> {
        self.check_open()?;
        if self.read_only {
            Err(StorageError::ReadOnly)
        } else {
            Ok(())
        }
    }

    fn len_u64(&self) -> u64 {
        self.records.len() as u64
    }
}

impl<R: Record> Default for MemoryBackend<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Record> StorageBackend<R> for MemoryBackend<R> {
    fn len(&self) -> StorageResult<u64> {
        self.check_open()?;
        Ok(self.len_u64())
    }

    fn read_segment(&self, offset: u64, count: u64) -> StorageResult<Vec<R>> {
        self.check_open()?;
        check_range(offset, count, self.len_u64())?;
        let start = offset as usize;
        Ok(self.records[start..start + count as usize].to_vec())
    }

    fn write_segment(&mut self, offset: u64, records: &[R]) -> StorageResult<()> {
        self.check_writable()?;
        check_range(offset, records.len() as u64, self.len_u64())?;
        trace!(offset, count = records.len(), "memory write_segment");
        let start = offset as usize;
        self.records[start..start + records.len()].copy_from_slice(records);
        Ok(())
    }

    fn insert_segment(&mut self, offset: u64, records: &[R]) -> StorageResult<()> {
        self.check_writable()?;
        if offset > self.len_u64() {
            return Err(StorageError::out_of_bounds(
                offset,
                records.len() as u64,
                self.len_u64(),
            ));
        }
        trace!(offset, count = records.len(), "memory insert_segment");
        let start = offset as usize;
        self.records.splice(start..start, records.iter().copied());
        Ok(())
    }

    fn delete_segment(&mut self, offset: u64, count: u64) -> StorageResult<()> {
        self.check_writable()?;
        check_range(offset, count, self.len_u64())?;
        trace!(offset, count, "memory delete_segment");
        let start = offset as usize;
        self.records.drain(start..start + count as usize);
        Ok(())
    }

    fn flush(&mut self) -> StorageResult<()> {
        self.check_open()
    }

    fn close(&mut self) -> StorageResult<()> {
        self.check_open()?;
        self.closed = true;
        Ok(())
    }

    fn is_read_only(&self) -> bool {
        self.read_only
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tickvault_common::Scalar;

    fn scalars(ticks: &[i64]) -> Vec<Scalar> {
        ticks.iter().map(|&t| Scalar::new(t, t as f64)).collect()
    }

    #[test]
    fn test_insert_write_delete() {
        let mut backend = MemoryBackend::with_records(scalars(&[1, 2, 5]));

        backend.insert_segment(2, &scalars(&[3, 4])).unwrap();
        assert_eq!(backend.records(), scalars(&[1, 2, 3, 4, 5]).as_slice());

        backend.write_segment(0, &[Scalar::new(1, 10.0)]).unwrap();
        assert_eq!(backend.records()[0].value, 10.0);

        backend.delete_segment(1, 3).unwrap();
        assert_eq!(backend.len().unwrap(), 2);
        assert_eq!(backend.read_segment(0, 2).unwrap()[1].ticks, 5);
    }

    #[test]
    fn test_append_at_end() {
        let mut backend = MemoryBackend::new();
        backend.insert_segment(0, &scalars(&[1])).unwrap();
        backend.insert_segment(1, &scalars(&[2])).unwrap();
        assert_eq!(backend.records(), scalars(&[1, 2]).as_slice());
    }

    #[test]
    fn test_out_of_bounds() {
        let mut backend = MemoryBackend::with_records(scalars(&[1, 2, 3]));
        assert!(matches!(
            backend.read_segment(2, 2),
            Err(StorageError::OutOfBounds { .. })
        ));
        assert!(backend.write_segment(3, &scalars(&[4])).is_err());
        assert!(backend.insert_segment(4, &scalars(&[4])).is_err());
        assert!(backend.delete_segment(0, 4).is_err());
        assert!(backend.read_segment(3, 0).unwrap().is_empty());
    }

    #[test]
    fn test_read_only() {
        let mut backend = MemoryBackend::read_only(scalars(&[1]));
        assert!(backend.is_read_only());
        assert!(backend.read_segment(0, 1).is_ok());
        assert!(backend
            .insert_segment(1, &scalars(&[2]))
            .unwrap_err()
            .is_read_only());
        assert!(backend.delete_segment(0, 1).is_err());
    }

    #[test]
    fn test_closed() {
        let mut backend = MemoryBackend::with_records(scalars(&[1]));
        backend.close().unwrap();
        assert!(backend.len().unwrap_err().is_closed());
        assert!(backend.read_segment(0, 1).unwrap_err().is_closed());
        assert!(backend.close().unwrap_err().is_closed());
    }
}
