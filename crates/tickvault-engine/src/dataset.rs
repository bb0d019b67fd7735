//! The dataset handle.

use std::marker::PhantomData;

use tickvault_common::{
    DataKind, DatasetConfig, DuplicateTimeTicks, Periodicity, Record,
    DEFAULT_MAXIMUM_READ_BUFFER_BYTES,
};
use tickvault_storage::{Container, DatasetLocation, FileBackend, MemoryBackend, StorageBackend};
use tracing::{debug, info, warn};

use crate::delete;
use crate::error::{DatasetError, DatasetResult};
use crate::index::{Searcher, Span, TicksIndex, TicksIndexRange};
use crate::merge::{merge_insert, validate_batch, AddSummary};
use crate::query;
use crate::spreader::spread_duplicate_time_ticks;

/// Cached count and boundary ticks of a dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DatasetMetadata {
    /// Number of records.
    pub count: u64,
    /// Ticks of the first record, 0 when empty.
    pub first_ticks: i64,
    /// Ticks of the last record, 0 when empty.
    pub last_ticks: i64,
}

/// A sorted, duplicate-free sequence of records over a storage backend.
///
/// Records are kept strictly ascending by ticks across every successful
/// add and delete. Reads take `&self`; mutations take `&mut self`, so a
/// handle is used by one caller at a time.
///
/// # Example
///
/// ```rust
/// use tickvault_common::{DuplicateTimeTicks, Scalar};
/// use tickvault_engine::Dataset;
///
/// let mut dataset = Dataset::<Scalar>::in_memory();
/// dataset
///     .add(&[Scalar::new(2, 2.1), Scalar::new(4, 4.1)], DuplicateTimeTicks::Fail)
///     .unwrap();
/// dataset
///     .add(&[Scalar::new(3, 3.1)], DuplicateTimeTicks::Fail)
///     .unwrap();
///
/// let mut out = Vec::new();
/// dataset.fetch_tick_range(&mut out, 3, 0).unwrap();
/// assert_eq!(out, vec![Scalar::new(3, 3.1), Scalar::new(4, 4.1)]);
/// assert_eq!(dataset.count(), 3);
/// ```
pub struct Dataset<R: Record, B: StorageBackend<R> = MemoryBackend<R>> {
    /// The backend; `None` once closed.
    backend: Option<B>,
    location: Option<DatasetLocation>,
    metadata: DatasetMetadata,
    maximum_read_buffer_bytes: usize,
    read_only: bool,
    _marker: PhantomData<fn() -> R>,
}

impl<R: Record> Dataset<R, MemoryBackend<R>> {
    /// Creates an empty in-memory dataset.
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            backend: Some(MemoryBackend::new()),
            location: None,
            metadata: DatasetMetadata::default(),
            maximum_read_buffer_bytes: DEFAULT_MAXIMUM_READ_BUFFER_BYTES,
            read_only: false,
            _marker: PhantomData,
        }
    }

    /// Creates an in-memory dataset from strictly ascending records.
    pub fn from_records(records: Vec<R>) -> DatasetResult<Self> {
        validate_batch(&records)?;
        Self::new(MemoryBackend::with_records(records), &DatasetConfig::default())
    }
}

impl<R: Record> Dataset<R, FileBackend<R>> {
    /// Opens (or creates) a dataset inside a container with its defaults.
    pub fn open(
        container: &Container,
        instrument_path: &str,
        kind: DataKind,
        periodicity: Periodicity,
    ) -> DatasetResult<Self> {
        Self::open_with(
            container,
            instrument_path,
            kind,
            periodicity,
            container.dataset_config(),
        )
    }

    /// Opens (or creates) a dataset inside a container with explicit settings.
    pub fn open_with(
        container: &Container,
        instrument_path: &str,
        kind: DataKind,
        periodicity: Periodicity,
        config: &DatasetConfig,
    ) -> DatasetResult<Self> {
        let location = container.locate(instrument_path, kind, periodicity)?;
        let backend = container.open_file_backend_with::<R>(&location, config)?;
        let dataset = Self::new(backend, config)?;
        info!(
            instrument = %location.instrument_path,
            data_path = %location.data_path,
            count = dataset.metadata.count,
            read_only = dataset.read_only,
            "opened dataset"
        );
        Ok(dataset.with_location(location))
    }
}

impl<R: Record, B: StorageBackend<R>> Dataset<R, B> {
    /// Wraps a backend whose records are already strictly ascending.
    pub fn new(backend: B, config: &DatasetConfig) -> DatasetResult<Self> {
        let metadata = load_metadata(&backend)?;
        Ok(Self {
            read_only: config.read_only || backend.is_read_only(),
            backend: Some(backend),
            location: None,
            metadata,
            maximum_read_buffer_bytes: config.maximum_read_buffer_bytes,
            _marker: PhantomData,
        })
    }

    /// Attaches the location the dataset was opened from.
    #[must_use]
    pub fn with_location(mut self, location: DatasetLocation) -> Self {
        self.location = Some(location);
        self
    }

    // =========================================================================
    // Metadata
    // =========================================================================

    /// Number of records; 0 once closed.
    #[must_use]
    pub fn count(&self) -> u64 {
        self.metadata.count
    }

    /// Ticks of the first record; 0 when empty or closed.
    #[must_use]
    pub fn first_ticks(&self) -> i64 {
        self.metadata.first_ticks
    }

    /// Ticks of the last record; 0 when empty or closed.
    #[must_use]
    pub fn last_ticks(&self) -> i64 {
        self.metadata.last_ticks
    }

    /// Cached metadata.
    #[must_use]
    pub fn metadata(&self) -> DatasetMetadata {
        self.metadata
    }

    /// Where the dataset lives, if it was opened from a container.
    #[must_use]
    pub fn location(&self) -> Option<&DatasetLocation> {
        self.location.as_ref()
    }

    /// Path of the dataset file, if any.
    #[must_use]
    pub fn file_path(&self) -> Option<&std::path::Path> {
        self.location.as_ref().map(|l| l.file_path.as_path())
    }

    /// Normalized instrument path, if any.
    #[must_use]
    pub fn instrument_path(&self) -> Option<&str> {
        self.location.as_ref().map(|l| l.instrument_path.as_str())
    }

    /// Upper bound on bytes read per backend round trip.
    #[must_use]
    pub fn maximum_read_buffer_bytes(&self) -> usize {
        self.maximum_read_buffer_bytes
    }

    /// Sets the read buffer bound. Values below one record read one record
    /// at a time.
    pub fn set_maximum_read_buffer_bytes(&mut self, bytes: usize) {
        self.maximum_read_buffer_bytes = bytes;
    }

    /// Returns true if adds and deletes are rejected.
    #[must_use]
    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    /// Returns true once [`close`](Self::close) has been called.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.backend.is_none()
    }

    // =========================================================================
    // Sorted index
    // =========================================================================

    /// Locates the last record at or before `ticks`.
    ///
    /// `exact` tells whether that record has exactly `ticks`. A tick before
    /// the first record resolves to `(0, false)` and a tick past the last
    /// record to `(count - 1, false)`.
    pub fn ticks_index(&self, ticks: i64) -> DatasetResult<TicksIndex> {
        self.searcher()?.ticks_index(ticks)
    }

    /// Returns the position where `ticks` is or would be inserted.
    pub fn lower_bound(&self, ticks: i64) -> DatasetResult<u64> {
        self.searcher()?.lower_bound(ticks)
    }

    /// Resolves the inclusive tick range `[from, to]` to an index span.
    pub fn ticks_index_range(&self, from: i64, to: i64) -> DatasetResult<TicksIndexRange> {
        self.searcher()?.ticks_index_range(from, to)
    }

    // =========================================================================
    // Add
    // =========================================================================

    /// Merges a strictly ascending batch into the dataset.
    ///
    /// Under [`DuplicateTimeTicks::Fail`] a batch record whose ticks are
    /// already stored aborts the whole add with
    /// [`DatasetError::DuplicateTicks`] and nothing is written. Under `Skip`
    /// such records are dropped; under `Update` they overwrite the stored
    /// record. A batch that is not strictly ascending is rejected with
    /// [`DatasetError::UnsortedBatch`]; see [`spread_duplicate_time_ticks`].
    pub fn add(&mut self, batch: &[R], policy: DuplicateTimeTicks) -> DatasetResult<AddSummary> {
        self.check_writable("add")?;
        let count = self.metadata.count;
        let buffer_records = self.buffer_records();
        let backend = self.backend_mut()?;

        let result = merge_insert(backend, count, batch, policy, buffer_records);
        let refreshed = self.refresh_metadata();
        let summary = result?;
        refreshed?;
        Ok(summary)
    }

    /// Spreads tied ticks in `batch`, then adds it.
    pub fn spread_and_add(
        &mut self,
        batch: &mut [R],
        policy: DuplicateTimeTicks,
    ) -> DatasetResult<AddSummary> {
        if spread_duplicate_time_ticks(batch) {
            debug!(len = batch.len(), "spread duplicate ticks in batch");
        }
        self.add(batch, policy)
    }

    // =========================================================================
    // Fetch
    // =========================================================================

    /// Appends every record to `out`. Returns the number appended.
    pub fn fetch_all(&self, out: &mut Vec<R>) -> DatasetResult<u64> {
        self.fetch_index_range(out, 0, u64::MAX)
    }

    /// Appends the records with ticks in `[from, to]` to `out`.
    ///
    /// A zero bound is unbounded on that side, so `(0, 0)` fetches
    /// everything. Returns the number appended; `out` is unchanged on error.
    pub fn fetch_tick_range(&self, out: &mut Vec<R>, from: i64, to: i64) -> DatasetResult<u64> {
        let span = query::tick_span(&self.searcher()?, from, to)?;
        self.collect(out, span)
    }

    /// Appends up to `count` records starting at index `from` to `out`.
    pub fn fetch_index_range(&self, out: &mut Vec<R>, from: u64, count: u64) -> DatasetResult<u64> {
        self.backend_ref()?;
        let span = query::index_span(from, count, self.metadata.count);
        self.collect(out, span)
    }

    /// Calls `f` for every record in ascending order.
    pub fn for_each_all(&self, f: impl FnMut(&R)) -> DatasetResult<u64> {
        self.for_each_index_range(0, u64::MAX, f)
    }

    /// Calls `f` for every record with ticks in `[from, to]`, zero bounds
    /// meaning unbounded.
    pub fn for_each_tick_range(&self, from: i64, to: i64, f: impl FnMut(&R)) -> DatasetResult<u64> {
        let span = query::tick_span(&self.searcher()?, from, to)?;
        query::stream(self.backend_ref()?, span, self.buffer_records(), f)
    }

    /// Calls `f` for up to `count` records starting at index `from`.
    pub fn for_each_index_range(
        &self,
        from: u64,
        count: u64,
        f: impl FnMut(&R),
    ) -> DatasetResult<u64> {
        let backend = self.backend_ref()?;
        let span = query::index_span(from, count, self.metadata.count);
        query::stream(backend, span, self.buffer_records(), f)
    }

    // =========================================================================
    // Delete
    // =========================================================================

    /// Deletes the inclusive index range `[first, last]`.
    ///
    /// Fails with [`DatasetError::IndexOutOfRange`] when `last >= count`.
    pub fn delete_index_range(&mut self, first: u64, last: u64) -> DatasetResult<u64> {
        self.check_writable("delete_index_range")?;
        let span = delete::index_range_span(first, last, self.metadata.count)?;
        self.delete(span)
    }

    /// Deletes every record with ticks in `[from, to]`. An empty range
    /// deletes nothing and succeeds.
    pub fn delete_tick_range(&mut self, from: i64, to: i64) -> DatasetResult<u64> {
        self.check_writable("delete_tick_range")?;
        let span = delete::tick_range_span(&self.searcher()?, from, to)?;
        self.delete(span)
    }

    /// Deletes every record with ticks at or before `ticks`.
    pub fn delete_all_before_tick(&mut self, ticks: i64) -> DatasetResult<u64> {
        self.check_writable("delete_all_before_tick")?;
        let span = delete::before_tick_span(&self.searcher()?, ticks)?;
        self.delete(span)
    }

    /// Deletes every record with ticks at or after `ticks`.
    pub fn delete_all_after_tick(&mut self, ticks: i64) -> DatasetResult<u64> {
        self.check_writable("delete_all_after_tick")?;
        let span = delete::after_tick_span(&self.searcher()?, ticks)?;
        self.delete(span)
    }

    /// Deletes indices `[0, index]`. Fails when `index >= count`.
    pub fn delete_all_before_index(&mut self, index: u64) -> DatasetResult<u64> {
        self.check_writable("delete_all_before_index")?;
        let span = delete::before_index_span(index, self.metadata.count)?;
        self.delete(span)
    }

    /// Deletes indices `[index, count)`.
    ///
    /// Unlike [`delete_all_before_index`](Self::delete_all_before_index), an
    /// index at or past the end is a successful no-op.
    pub fn delete_all_after_index(&mut self, index: u64) -> DatasetResult<u64> {
        self.check_writable("delete_all_after_index")?;
        let span = delete::after_index_span(index, self.metadata.count);
        if span.is_empty() {
            debug!(index, count = self.metadata.count, "delete after index past the end");
        }
        self.delete(span)
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Persists pending changes.
    pub fn flush(&mut self) -> DatasetResult<()> {
        self.backend_mut()?.flush()?;
        Ok(())
    }

    /// Flushes and closes the dataset. Every later operation fails with
    /// [`DatasetError::Closed`].
    pub fn close(&mut self) -> DatasetResult<()> {
        let mut backend = self.backend.take().ok_or(DatasetError::Closed)?;
        self.metadata = DatasetMetadata::default();
        backend.close()?;
        match self.instrument_path() {
            Some(instrument) => info!(instrument, "closed dataset"),
            None => debug!("closed dataset"),
        }
        Ok(())
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn backend_ref(&self) -> DatasetResult<&B> {
        self.backend.as_ref().ok_or(DatasetError::Closed)
    }

    fn backend_mut(&mut self) -> DatasetResult<&mut B> {
        self.backend.as_mut().ok_or(DatasetError::Closed)
    }

    fn check_writable(&self, operation: &'static str) -> DatasetResult<()> {
        self.backend_ref()?;
        if self.read_only {
            warn!(operation, "rejected mutation of read-only dataset");
            return Err(DatasetError::ReadOnly);
        }
        Ok(())
    }

    fn buffer_records(&self) -> u64 {
        (self.maximum_read_buffer_bytes / R::ENCODED_LEN).max(1) as u64
    }

    fn searcher(&self) -> DatasetResult<Searcher<'_, R, B>> {
        Ok(Searcher::new(
            self.backend_ref()?,
            self.metadata.count,
            self.buffer_records(),
        ))
    }

    fn collect(&self, out: &mut Vec<R>, span: Span) -> DatasetResult<u64> {
        query::collect_into(self.backend_ref()?, span, self.buffer_records(), out)
    }

    fn delete(&mut self, span: Span) -> DatasetResult<u64> {
        let result = delete::delete_span(self.backend_mut()?, span);
        if !span.is_empty() {
            let refreshed = self.refresh_metadata();
            let removed = result?;
            refreshed?;
            debug!(start = span.start, removed, count = self.metadata.count, "deleted records");
            return Ok(removed);
        }
        result
    }

    fn refresh_metadata(&mut self) -> DatasetResult<()> {
        self.metadata = load_metadata(self.backend_ref()?)?;
        Ok(())
    }
}

impl<R: Record, B: StorageBackend<R>> std::fmt::Debug for Dataset<R, B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dataset")
            .field("kind", &R::KIND)
            .field("location", &self.location)
            .field("metadata", &self.metadata)
            .field("read_only", &self.read_only)
            .field("closed", &self.is_closed())
            .finish()
    }
}

fn load_metadata<R, B>(backend: &B) -> DatasetResult<DatasetMetadata>
where
    R: Record,
    B: StorageBackend<R> + ?Sized,
{
    let count = backend.len()?;
    if count == 0 {
        return Ok(DatasetMetadata::default());
    }

    let searcher = Searcher::new(backend, count, 1);
    let first_ticks = searcher.record_at(0)?.ticks();
    let last_ticks = if count == 1 {
        first_ticks
    } else {
        searcher.record_at(count - 1)?.ticks()
    };
    Ok(DatasetMetadata {
        count,
        first_ticks,
        last_ticks,
    })
}
