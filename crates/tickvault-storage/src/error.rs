//! Storage error types.

use std::io;
use std::path::PathBuf;

use thiserror::Error;
use tickvault_common::{CodecError, ConfigError, ErrorCode, RecordKind};

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors raised by storage backends and the container.
#[derive(Debug, Error)]
#[allow(missing_docs)] // Fields are documented by variant docs
pub enum StorageError {
    /// Standard I/O error.
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },

    /// File not found.
    #[error("file not found: {path}")]
    NotFound { path: PathBuf },

    /// Permission denied.
    #[error("permission denied: {path}")]
    PermissionDenied { path: PathBuf },

    /// A segment does not fit inside the stored sequence.
    #[error("segment [{offset}, {offset}+{count}) out of bounds for length {len}")]
    OutOfBounds { offset: u64, count: u64, len: u64 },

    /// The backend has been closed.
    #[error("backend is closed")]
    Closed,

    /// A write was attempted on a read-only backend.
    #[error("backend is read-only")]
    ReadOnly,

    /// The stored record kind differs from the requested one.
    #[error("record kind mismatch: expected {expected}, found {actual}")]
    KindMismatch {
        expected: RecordKind,
        actual: RecordKind,
    },

    /// The file contents are inconsistent with its header.
    #[error("corrupted dataset file {path}: {reason}")]
    Corrupted { path: PathBuf, reason: String },

    /// An instrument path was rejected.
    #[error("invalid instrument path {path:?}: {reason}")]
    InvalidInstrumentPath { path: String, reason: String },

    /// Header or data-path decoding failed.
    #[error(transparent)]
    Codec(#[from] CodecError),

    /// The store configuration was rejected.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl StorageError {
    /// Creates an OutOfBounds error.
    pub fn out_of_bounds(offset: u64, count: u64, len: u64) -> Self {
        Self::OutOfBounds { offset, count, len }
    }

    /// Creates a Corrupted error.
    pub fn corrupted(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::Corrupted {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Creates an InvalidInstrumentPath error.
    pub fn invalid_instrument_path(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidInstrumentPath {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Converts from std::io::Error with path context.
    pub fn from_io_with_path(err: io::Error, path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        match err.kind() {
            io::ErrorKind::NotFound => Self::NotFound { path },
            io::ErrorKind::PermissionDenied => Self::PermissionDenied { path },
            _ => Self::Io { source: err },
        }
    }

    /// Returns true if this is a "not found" error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
            || matches!(self, Self::Io { source } if source.kind() == io::ErrorKind::NotFound)
    }

    /// Returns true if the backend was closed.
    pub fn is_closed(&self) -> bool {
        matches!(self, Self::Closed)
    }

    /// Returns true if a write hit a read-only backend.
    pub fn is_read_only(&self) -> bool {
        matches!(self, Self::ReadOnly)
    }

    /// Returns the stable error code.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Io { .. } => ErrorCode::Io,
            Self::NotFound { .. } => ErrorCode::FileNotFound,
            Self::PermissionDenied { .. } => ErrorCode::PermissionDenied,
            Self::OutOfBounds { .. } => ErrorCode::OutOfBounds,
            Self::Closed => ErrorCode::Closed,
            Self::ReadOnly => ErrorCode::ReadOnly,
            Self::KindMismatch { .. } => ErrorCode::KindMismatch,
            Self::Corrupted { .. } => ErrorCode::Corruption,
            Self::InvalidInstrumentPath { .. } => ErrorCode::InvalidArgument,
            Self::Codec(err) => err.code(),
            Self::Config(_) => ErrorCode::InvalidArgument,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_io_with_path() {
        let err = StorageError::from_io_with_path(
            io::Error::new(io::ErrorKind::NotFound, "gone"),
            "/tmp/x.tvd",
        );
        assert!(err.is_not_found());
        assert_eq!(err.code(), ErrorCode::FileNotFound);

        let err = StorageError::from_io_with_path(
            io::Error::new(io::ErrorKind::Other, "boom"),
            "/tmp/x.tvd",
        );
        assert!(matches!(err, StorageError::Io { .. }));
    }

    #[test]
    fn test_codes() {
        assert_eq!(
            StorageError::out_of_bounds(3, 2, 4).code(),
            ErrorCode::OutOfBounds
        );
        assert_eq!(StorageError::Closed.code(), ErrorCode::Closed);
        assert_eq!(StorageError::ReadOnly.code(), ErrorCode::ReadOnly);
        assert_eq!(
            StorageError::from(CodecError::invalid_header("bad magic")).code(),
            ErrorCode::Corruption
        );
    }

    #[test]
    fn test_display() {
        let err = StorageError::out_of_bounds(3, 2, 4);
        assert_eq!(
            err.to_string(),
            "segment [3, 3+2) out of bounds for length 4"
        );
    }
}
