//! Stable error codes.

use std::fmt;

/// Error codes for categorizing errors.
///
/// These codes can be used for programmatic error handling and
/// are stable across versions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum ErrorCode {
    // General errors (0x0000 - 0x00FF)
    /// Unknown or unspecified error.
    Unknown = 0x0000,
    /// Internal error (bug).
    Internal = 0x0001,
    /// Invalid argument provided.
    InvalidArgument = 0x0003,

    // I/O errors (0x0100 - 0x01FF)
    /// General I/O error.
    Io = 0x0100,
    /// File not found.
    FileNotFound = 0x0101,
    /// Permission denied.
    PermissionDenied = 0x0102,
    /// Data corruption detected.
    Corruption = 0x0104,

    // Storage errors (0x0200 - 0x02FF)
    /// Segment lies outside the stored sequence.
    OutOfBounds = 0x0200,
    /// Backend was opened read-only.
    ReadOnly = 0x0201,
    /// Backend or handle is closed.
    Closed = 0x0202,
    /// Stored record kind differs from the requested one.
    KindMismatch = 0x0203,

    // Dataset errors (0x0300 - 0x03FF)
    /// Batch tick collides with a stored tick under the Fail policy.
    DuplicateTicks = 0x0300,
    /// Batch is not strictly ascending.
    UnsortedBatch = 0x0301,
    /// Index lies at or beyond the record count.
    IndexOutOfRange = 0x0302,
    /// Range bounds are inverted.
    InvalidRange = 0x0303,
}

impl ErrorCode {
    /// Returns the numeric code.
    #[inline]
    #[must_use]
    pub const fn as_u16(self) -> u16 {
        self as u16
    }

    /// Returns the error category name.
    #[must_use]
    pub const fn category(&self) -> &'static str {
        match (*self as u16) >> 8 {
            0x00 => "General",
            0x01 => "I/O",
            0x02 => "Storage",
            0x03 => "Dataset",
            _ => "Unknown",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}
