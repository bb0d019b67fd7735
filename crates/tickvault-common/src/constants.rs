//! System-wide constants for tickvault.
//!
//! File-format constants are part of the on-disk contract; changing them
//! requires a format version bump.

// =============================================================================
// Dataset Defaults
// =============================================================================

/// Default upper bound on how many bytes a single fetch, add or delete
/// materializes per backend round trip (1 MiB).
pub const DEFAULT_MAXIMUM_READ_BUFFER_BYTES: usize = 1024 * 1024;

/// Default chunk size used by the file backend when shifting records (1 MiB).
pub const DEFAULT_SHIFT_CHUNK_BYTES: usize = 1024 * 1024;

// =============================================================================
// File Format Constants
// =============================================================================

/// Magic bytes at the start of every dataset file.
pub const FILE_MAGIC: [u8; 4] = *b"TVDS";

/// Current dataset file format version.
pub const FILE_FORMAT_VERSION: u16 = 1;

/// Size of the dataset file header in bytes.
///
/// The header contains: magic (4), version (2), record kind (1), reserved (1),
/// record length (4), record count (8), checksum (4), padding up to 64.
pub const FILE_HEADER_SIZE: usize = 64;

/// Default extension of dataset files inside a container.
pub const DEFAULT_FILE_EXTENSION: &str = "tvd";

/// Separator between instrument path components.
pub const INSTRUMENT_PATH_SEPARATOR: char = '/';

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constants() {
        assert!(DEFAULT_MAXIMUM_READ_BUFFER_BYTES > 0);
        assert!(DEFAULT_SHIFT_CHUNK_BYTES > 0);
        assert_eq!(FILE_MAGIC.len(), 4);
        assert!(FILE_HEADER_SIZE >= 4 + 2 + 1 + 1 + 4 + 8 + 4);
    }
}
