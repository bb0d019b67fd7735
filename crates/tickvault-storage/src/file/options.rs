//! Dataset file open options.

use tickvault_common::{DatasetConfig, DEFAULT_SHIFT_CHUNK_BYTES};

/// Options for opening dataset files.
///
/// # Example
///
/// ```rust
/// use tickvault_storage::OpenOptions;
///
/// let options = OpenOptions::new()
///     .create(true)
///     .sync_on_flush(false)
///     .chunk_bytes(64 * 1024);
/// assert!(!options.is_read_only());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenOptions {
    /// Open without write access.
    pub(crate) read_only: bool,
    /// Create the file if it doesn't exist.
    pub(crate) create: bool,
    /// Discard existing records.
    pub(crate) truncate: bool,
    /// Call `sync_data` on flush.
    pub(crate) sync_on_flush: bool,
    /// Verify the header checksum on open.
    pub(crate) verify_checksum: bool,
    /// Upper bound on bytes moved per step when shifting the tail.
    pub(crate) chunk_bytes: usize,
}

impl OpenOptions {
    /// Creates options for a writable, existing file.
    #[must_use]
    pub fn new() -> Self {
        Self {
            read_only: false,
            create: false,
            truncate: false,
            sync_on_flush: true,
            verify_checksum: true,
            chunk_bytes: DEFAULT_SHIFT_CHUNK_BYTES,
        }
    }

    /// Derives options from a dataset configuration.
    #[must_use]
    pub fn from_config(config: &DatasetConfig) -> Self {
        Self::new()
            .read_only(config.read_only)
            .create(config.create_if_missing && !config.read_only)
            .sync_on_flush(config.sync_on_flush)
            .verify_checksum(config.verify_checksum)
    }

    /// Sets read-only mode.
    #[must_use]
    pub fn read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }

    /// Sets the option to create a missing file.
    #[must_use]
    pub fn create(mut self, create: bool) -> Self {
        self.create = create;
        self
    }

    /// Sets the option to truncate an existing file to zero records.
    #[must_use]
    pub fn truncate(mut self, truncate: bool) -> Self {
        self.truncate = truncate;
        self
    }

    /// Sets whether flush syncs file data.
    #[must_use]
    pub fn sync_on_flush(mut self, sync: bool) -> Self {
        self.sync_on_flush = sync;
        self
    }

    /// Sets whether the header checksum is verified on open.
    #[must_use]
    pub fn verify_checksum(mut self, verify: bool) -> Self {
        self.verify_checksum = verify;
        self
    }

    /// Sets the shift chunk size in bytes.
    #[must_use]
    pub fn chunk_bytes(mut self, bytes: usize) -> Self {
        self.chunk_bytes = bytes;
        self
    }

    /// Returns true if the file is opened read-only.
    #[must_use]
    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    /// Converts to standard library options.
    pub(crate) fn to_std_options(&self) -> std::fs::OpenOptions {
        let mut opts = std::fs::OpenOptions::new();
        opts.read(true).write(!self.read_only);
        if !self.read_only {
            opts.create(self.create);
        }
        opts
    }
}

impl Default for OpenOptions {
    fn default() -> Self {
        Self::new()
    }
}
