//! Error handling for tickvault.
//!
//! Every crate defines its own error enum; this module provides the stable
//! error codes they share and the codec error used by the type layer.

mod codec;
mod codes;

pub use codec::CodecError;
pub use codes::ErrorCode;

/// Result type alias for codec operations.
pub type CodecResult<T> = std::result::Result<T, CodecError>;
