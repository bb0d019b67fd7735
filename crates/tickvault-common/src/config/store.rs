//! Store and dataset configuration structures.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::{DEFAULT_FILE_EXTENSION, DEFAULT_MAXIMUM_READ_BUFFER_BYTES};

/// Errors raised while loading, saving or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Reading or writing the configuration file failed.
    #[error("config I/O error on {path}: {source}")]
    Io {
        /// File being read or written.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The file is not valid TOML for this structure.
    #[error("config parse error: {0}")]
    Parse(#[from] toml::de::Error),

    /// The configuration could not be rendered as TOML.
    #[error("config serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// A value is out of range.
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Per-dataset configuration.
///
/// # Example
///
/// ```rust
/// use tickvault_common::config::DatasetConfig;
///
/// let config = DatasetConfig::default().with_read_only(true);
/// assert_eq!(config.maximum_read_buffer_bytes, 1024 * 1024);
/// assert!(config.read_only);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetConfig {
    /// Upper bound on bytes materialized per backend round trip.
    /// Default: 1048576 (1 MiB)
    #[serde(default = "default_read_buffer_bytes")]
    pub maximum_read_buffer_bytes: usize,

    /// Reject every mutating operation.
    /// Default: false
    #[serde(default)]
    pub read_only: bool,

    /// Call `sync_data` on flush.
    /// Default: true
    #[serde(default = "default_true")]
    pub sync_on_flush: bool,

    /// Verify the header checksum when opening a dataset file.
    /// Default: true
    #[serde(default = "default_true")]
    pub verify_checksum: bool,

    /// Create missing dataset files on open.
    /// Default: true
    #[serde(default = "default_true")]
    pub create_if_missing: bool,
}

fn default_read_buffer_bytes() -> usize {
    DEFAULT_MAXIMUM_READ_BUFFER_BYTES
}

fn default_true() -> bool {
    true
}

fn default_file_extension() -> String {
    DEFAULT_FILE_EXTENSION.to_string()
}

fn default_root_dir() -> PathBuf {
    PathBuf::from("./data")
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            maximum_read_buffer_bytes: default_read_buffer_bytes(),
            read_only: false,
            sync_on_flush: true,
            verify_checksum: true,
            create_if_missing: true,
        }
    }
}

impl DatasetConfig {
    /// Sets the maximum read buffer size in bytes.
    #[must_use]
    pub fn with_maximum_read_buffer_bytes(mut self, bytes: usize) -> Self {
        self.maximum_read_buffer_bytes = bytes;
        self
    }

    /// Sets whether datasets are opened read-only.
    #[must_use]
    pub fn with_read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }

    /// Sets whether flush syncs data to disk.
    #[must_use]
    pub fn with_sync_on_flush(mut self, sync: bool) -> Self {
        self.sync_on_flush = sync;
        self
    }

    /// Sets whether header checksums are verified on open.
    #[must_use]
    pub fn with_verify_checksum(mut self, verify: bool) -> Self {
        self.verify_checksum = verify;
        self
    }

    /// Sets whether missing dataset files are created on open.
    #[must_use]
    pub fn with_create_if_missing(mut self, create: bool) -> Self {
        self.create_if_missing = create;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.maximum_read_buffer_bytes == 0 {
            return Err(ConfigError::Invalid(
                "maximum_read_buffer_bytes must be positive".to_string(),
            ));
        }
        if self.read_only && self.create_if_missing {
            return Err(ConfigError::Invalid(
                "create_if_missing cannot be combined with read_only".to_string(),
            ));
        }
        Ok(())
    }
}

/// Configuration of a container holding many datasets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Root directory of the container.
    #[serde(default = "default_root_dir")]
    pub root_dir: PathBuf,

    /// Extension of dataset files.
    #[serde(default = "default_file_extension")]
    pub file_extension: String,

    /// Defaults applied to every opened dataset.
    #[serde(default)]
    pub dataset: DatasetConfig,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            root_dir: default_root_dir(),
            file_extension: default_file_extension(),
            dataset: DatasetConfig::default(),
        }
    }
}

impl StoreConfig {
    /// Creates a configuration rooted at `root_dir`.
    #[must_use]
    pub fn with_root_dir(root_dir: impl Into<PathBuf>) -> Self {
        Self {
            root_dir: root_dir.into(),
            ..Default::default()
        }
    }

    /// Sets the dataset defaults.
    #[must_use]
    pub fn with_dataset(mut self, dataset: DatasetConfig) -> Self {
        self.dataset = dataset;
        self
    }

    /// Sets the dataset file extension.
    #[must_use]
    pub fn with_file_extension(mut self, extension: impl Into<String>) -> Self {
        self.file_extension = extension.into();
        self
    }

    /// Loads configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Saves configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = self.to_toml()?;
        let io_err = |source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }
        std::fs::write(path, content).map_err(io_err)
    }

    /// Converts configuration to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.file_extension.is_empty() || self.file_extension.contains(['.', '/', '\\']) {
            return Err(ConfigError::Invalid(format!(
                "file_extension {:?} must be a bare extension",
                self.file_extension
            )));
        }
        self.dataset.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults() {
        let config = StoreConfig::default();
        assert_eq!(config.file_extension, "tvd");
        assert_eq!(config.dataset.maximum_read_buffer_bytes, 1024 * 1024);
        assert!(!config.dataset.read_only);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: StoreConfig = toml::from_str(
            r#"
            root_dir = "/srv/market"

            [dataset]
            maximum_read_buffer_bytes = 4096
            "#,
        )
        .unwrap();
        assert_eq!(config.root_dir, PathBuf::from("/srv/market"));
        assert_eq!(config.file_extension, "tvd");
        assert_eq!(config.dataset.maximum_read_buffer_bytes, 4096);
        assert!(config.dataset.sync_on_flush);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("conf").join("store.toml");

        let config = StoreConfig::with_root_dir(dir.path().join("data"))
            .with_dataset(DatasetConfig::default().with_maximum_read_buffer_bytes(64 * 1024));
        config.save(&path).unwrap();

        let loaded = StoreConfig::from_file(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_validation() {
        let config = DatasetConfig::default().with_maximum_read_buffer_bytes(0);
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let config = DatasetConfig::default().with_read_only(true);
        assert!(config.validate().is_err());
        assert!(config.with_create_if_missing(false).validate().is_ok());

        let config = StoreConfig::default().with_file_extension(".tvd");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_file() {
        let err = StoreConfig::from_file(Path::new("/nonexistent/store.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
