//! Hierarchical dataset container.
//!
//! A container is a directory tree. Each instrument is a directory reached by
//! its instrument path (`/a/b/c` maps to `root/a/b/c`), and each dataset of an
//! instrument is a file named after its data path (`c_m03.tvd`).

use std::fs;
use std::path::{Path, PathBuf};

use tickvault_common::{
    DataKind, DataPath, DatasetConfig, Periodicity, Record, StoreConfig,
    INSTRUMENT_PATH_SEPARATOR,
};
use tracing::{debug, info};

use crate::error::{StorageError, StorageResult};
use crate::file::{FileBackend, OpenOptions};

/// Where a dataset lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetLocation {
    /// Full path of the dataset file.
    pub file_path: PathBuf,
    /// Normalized instrument path, e.g. `/a/b/c`.
    pub instrument_path: String,
    /// Data path inside the instrument.
    pub data_path: DataPath,
}

/// Normalizes an instrument path.
///
/// Leading, trailing and repeated separators are dropped and the result is
/// rooted (`a//b/` becomes `/a/b`). Paths without components, and paths
/// containing `.` or `..` or backslashes, are rejected.
pub fn normalize_instrument_path(path: &str) -> StorageResult<String> {
    let mut normalized = String::with_capacity(path.len() + 1);
    for component in path
        .split(INSTRUMENT_PATH_SEPARATOR)
        .filter(|c| !c.is_empty())
    {
        if component == "." || component == ".." {
            return Err(StorageError::invalid_instrument_path(
                path,
                format!("relative component {component:?}"),
            ));
        }
        if component.trim().is_empty() {
            return Err(StorageError::invalid_instrument_path(
                path,
                "blank component",
            ));
        }
        if component.contains(['\\', '\0']) {
            return Err(StorageError::invalid_instrument_path(
                path,
                "component contains a reserved character",
            ));
        }
        normalized.push(INSTRUMENT_PATH_SEPARATOR);
        normalized.push_str(component);
    }

    if normalized.is_empty() {
        return Err(StorageError::invalid_instrument_path(path, "no components"));
    }
    Ok(normalized)
}

/// A directory tree of dataset files.
#[derive(Debug, Clone)]
pub struct Container {
    config: StoreConfig,
}

impl Container {
    /// Creates a container from a validated configuration.
    ///
    /// The root directory is created lazily, when the first dataset is.
    pub fn new(config: StoreConfig) -> StorageResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Creates a container rooted at `root_dir` with default settings.
    pub fn open(root_dir: impl Into<PathBuf>) -> StorageResult<Self> {
        Self::new(StoreConfig::with_root_dir(root_dir))
    }

    /// Returns the root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.config.root_dir
    }

    /// Returns the dataset defaults.
    #[must_use]
    pub fn dataset_config(&self) -> &DatasetConfig {
        &self.config.dataset
    }

    /// Resolves the location of a dataset.
    pub fn locate(
        &self,
        instrument_path: &str,
        kind: DataKind,
        periodicity: Periodicity,
    ) -> StorageResult<DatasetLocation> {
        let instrument_path = normalize_instrument_path(instrument_path)?;
        let data_path = DataPath::new(kind, periodicity)?;
        let file_path = self
            .instrument_dir(&instrument_path)
            .join(format!("{data_path}.{}", self.config.file_extension));

        Ok(DatasetLocation {
            file_path,
            instrument_path,
            data_path,
        })
    }

    /// Opens the file backend of a dataset with the container's defaults.
    pub fn open_file_backend<R: Record>(
        &self,
        location: &DatasetLocation,
    ) -> StorageResult<FileBackend<R>> {
        self.open_file_backend_with(location, &self.config.dataset)
    }

    /// Opens the file backend of a dataset with explicit settings.
    ///
    /// Fails with [`StorageError::KindMismatch`] when `R` is not the record
    /// type of the location's data kind.
    pub fn open_file_backend_with<R: Record>(
        &self,
        location: &DatasetLocation,
        config: &DatasetConfig,
    ) -> StorageResult<FileBackend<R>> {
        let expected = location.data_path.record_kind();
        if expected != R::KIND {
            return Err(StorageError::KindMismatch {
                expected,
                actual: R::KIND,
            });
        }

        let options = OpenOptions::from_config(config);
        if options.create {
            if let Some(parent) = location.file_path.parent() {
                fs::create_dir_all(parent)
                    .map_err(|e| StorageError::from_io_with_path(e, parent))?;
            }
        }
        debug!(
            instrument = %location.instrument_path,
            data_path = %location.data_path,
            "opening dataset"
        );
        FileBackend::open(&location.file_path, options)
    }

    /// Lists the data paths stored for an instrument, sorted by code.
    ///
    /// An instrument without a directory has no datasets. Files whose names
    /// are not data paths are ignored.
    pub fn list_data_paths(&self, instrument_path: &str) -> StorageResult<Vec<DataPath>> {
        let instrument_path = normalize_instrument_path(instrument_path)?;
        let dir = self.instrument_dir(&instrument_path);

        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StorageError::from_io_with_path(e, &dir)),
        };

        let mut paths = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if !path.is_file()
                || path.extension().and_then(|e| e.to_str())
                    != Some(self.config.file_extension.as_str())
            {
                continue;
            }
            if let Some(data_path) = path
                .file_stem()
                .and_then(|s| s.to_str())
                .and_then(|s| s.parse::<DataPath>().ok())
            {
                paths.push(data_path);
            }
        }
        paths.sort_by_key(ToString::to_string);
        Ok(paths)
    }

    /// Deletes a dataset file. Returns false if it did not exist.
    pub fn remove_dataset(&self, location: &DatasetLocation) -> StorageResult<bool> {
        match fs::remove_file(&location.file_path) {
            Ok(()) => {
                info!(path = %location.file_path.display(), "removed dataset");
                Ok(true)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(StorageError::from_io_with_path(e, &location.file_path)),
        }
    }

    fn instrument_dir(&self, normalized: &str) -> PathBuf {
        normalized
            .split(INSTRUMENT_PATH_SEPARATOR)
            .filter(|c| !c.is_empty())
            .fold(self.config.root_dir.clone(), |dir, c| dir.join(c))
    }
}
