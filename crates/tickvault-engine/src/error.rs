//! Dataset error types.

use thiserror::Error;
use tickvault_common::ErrorCode;
use tickvault_storage::StorageError;

/// Result type for dataset operations.
pub type DatasetResult<T> = Result<T, DatasetError>;

/// Errors returned by dataset operations.
///
/// Every failing operation leaves the dataset unchanged, except that a
/// storage failure in the middle of a Skip or Update merge may leave the
/// records written so far.
#[derive(Debug, Error)]
pub enum DatasetError {
    /// A batch record collides with a stored record under the Fail policy.
    #[error("duplicate ticks {ticks}: record already exists")]
    DuplicateTicks {
        /// The colliding ticks.
        ticks: i64,
    },

    /// A batch is not strictly ascending by ticks.
    #[error("batch not strictly ascending at index {index}: {ticks} after {previous}")]
    UnsortedBatch {
        /// Position of the offending record in the batch.
        index: usize,
        /// Ticks of the record before it.
        previous: i64,
        /// Ticks of the offending record.
        ticks: i64,
    },

    /// An index is at or beyond the record count.
    #[error("index {index} out of range for {count} records")]
    IndexOutOfRange {
        /// The offending index.
        index: u64,
        /// Number of stored records.
        count: u64,
    },

    /// An index range ends before it starts.
    #[error("invalid index range [{first}, {last}]")]
    InvalidRange {
        /// First index.
        first: u64,
        /// Last index.
        last: u64,
    },

    /// The dataset has been closed.
    #[error("dataset is closed")]
    Closed,

    /// A mutation was attempted on a read-only dataset.
    #[error("dataset is read-only")]
    ReadOnly,

    /// The storage backend failed.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

impl DatasetError {
    /// Creates an IndexOutOfRange error.
    pub fn index_out_of_range(index: u64, count: u64) -> Self {
        Self::IndexOutOfRange { index, count }
    }

    /// Returns true for a Fail-policy collision.
    pub fn is_duplicate(&self) -> bool {
        matches!(self, Self::DuplicateTicks { .. })
    }

    /// Returns true if the dataset (or its backend) was closed.
    pub fn is_closed(&self) -> bool {
        match self {
            Self::Closed => true,
            Self::Storage(err) => err.is_closed(),
            _ => false,
        }
    }

    /// Returns true if a mutation hit a read-only dataset (or backend).
    pub fn is_read_only(&self) -> bool {
        match self {
            Self::ReadOnly => true,
            Self::Storage(err) => err.is_read_only(),
            _ => false,
        }
    }

    /// Returns true if the arguments were rejected before any mutation.
    pub fn is_invalid_argument(&self) -> bool {
        matches!(
            self,
            Self::UnsortedBatch { .. } | Self::IndexOutOfRange { .. } | Self::InvalidRange { .. }
        )
    }

    /// Returns the stable error code.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::DuplicateTicks { .. } => ErrorCode::DuplicateTicks,
            Self::UnsortedBatch { .. } => ErrorCode::UnsortedBatch,
            Self::IndexOutOfRange { .. } => ErrorCode::IndexOutOfRange,
            Self::InvalidRange { .. } => ErrorCode::InvalidRange,
            Self::Closed => ErrorCode::Closed,
            Self::ReadOnly => ErrorCode::ReadOnly,
            Self::Storage(err) => err.code(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_predicates() {
        assert!(DatasetError::DuplicateTicks { ticks: 1 }.is_duplicate());
        assert!(DatasetError::Closed.is_closed());
        assert!(DatasetError::from(StorageError::Closed).is_closed());
        assert!(DatasetError::from(StorageError::ReadOnly).is_read_only());
        assert!(DatasetError::index_out_of_range(5, 5).is_invalid_argument());
        assert!(!DatasetError::ReadOnly.is_invalid_argument());
    }

    #[test]
    fn test_codes() {
        assert_eq!(
            DatasetError::DuplicateTicks { ticks: 1 }.code(),
            ErrorCode::DuplicateTicks
        );
        assert_eq!(
            DatasetError::InvalidRange { first: 3, last: 1 }.code(),
            ErrorCode::InvalidRange
        );
        assert_eq!(
            DatasetError::from(StorageError::out_of_bounds(1, 1, 0)).code(),
            ErrorCode::OutOfBounds
        );
    }

    #[test]
    fn test_display() {
        let err = DatasetError::index_out_of_range(5, 5);
        assert_eq!(err.to_string(), "index 5 out of range for 5 records");
    }
}
