//! Codec error types.
//!
//! Raised while parsing data-path codes, record kind tags and dataset file
//! headers.

use thiserror::Error;

use super::codes::ErrorCode;

/// Errors raised while encoding or decoding tickvault identifiers and headers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// Unknown record kind tag.
    #[error("unknown record kind tag: {0}")]
    UnknownRecordKind(u8),

    /// Unknown data kind code.
    #[error("unknown data kind code: {0:?}")]
    UnknownDataKind(String),

    /// Periodicity code could not be parsed.
    #[error("invalid periodicity code: {0:?}")]
    InvalidPeriodicity(String),

    /// Data path is malformed.
    #[error("invalid data path {path:?}: {reason}")]
    InvalidDataPath {
        /// The offending data path.
        path: String,
        /// Why it was rejected.
        reason: String,
    },

    /// Data kind cannot be combined with the periodicity.
    #[error("data kind {kind} cannot be stored with periodicity {periodicity}")]
    IncompatiblePeriodicity {
        /// Data kind code.
        kind: String,
        /// Periodicity code.
        periodicity: String,
    },

    /// Header bytes do not describe a dataset file.
    #[error("invalid header: {0}")]
    InvalidHeader(String),
}

impl CodecError {
    /// Creates an invalid data path error.
    pub fn invalid_data_path(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidDataPath {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Creates an invalid header error.
    pub fn invalid_header(reason: impl Into<String>) -> Self {
        Self::InvalidHeader(reason.into())
    }

    /// Returns the error code for this error.
    #[must_use]
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::InvalidHeader(_) => ErrorCode::Corruption,
            _ => ErrorCode::InvalidArgument,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codec_error_display() {
        let err = CodecError::invalid_data_path("x_m03", "unknown kind");
        assert!(err.to_string().contains("x_m03"));
        assert!(err.to_string().contains("unknown kind"));
        assert_eq!(err.code(), ErrorCode::InvalidArgument);

        let err = CodecError::invalid_header("bad magic");
        assert_eq!(err.code(), ErrorCode::Corruption);
    }
}
