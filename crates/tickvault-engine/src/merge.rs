//! Merge-insert of a sorted batch into a sorted backend.
//!
//! An add runs in three phases:
//!
//! 1. **Locate**: every batch record gets its lower-bound position among the
//!    stored records and a flag telling whether it collides with a stored
//!    record. Positions are found in memory when the overlapped window fits
//!    the read buffer, and by probing the backend otherwise.
//! 2. **Verify**: under [`DuplicateTimeTicks::Fail`] any collision aborts the
//!    add before anything is written.
//! 3. **Apply**: collisions are overwritten in place (Update) or dropped
//!    (Skip); new records are merged with the stored tail back to front.
//!
//! The back-to-front merge grows the backend once by the number of new
//! records and then rewrites the shifted tail in contiguous runs, reading the
//! stored tail in buffer-sized chunks. Every run is written at or after the
//! position of the lowest stored record still unread, so no record is
//! overwritten before it is read.

use tickvault_common::{DuplicateTimeTicks, Keyed, Record};
use tickvault_storage::{StorageBackend, StorageError};
use tracing::{debug, trace, warn};

use crate::error::{DatasetError, DatasetResult};
use crate::index::Searcher;

/// What an add did with each batch record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AddSummary {
    /// Records inserted at new ticks.
    pub inserted: u64,
    /// Stored records overwritten under the Update policy.
    pub updated: u64,
    /// Batch records dropped under the Skip policy.
    pub skipped: u64,
}

impl AddSummary {
    /// Total number of batch records processed.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.inserted + self.updated + self.skipped
    }
}

/// Checks that a batch is strictly ascending by ticks.
pub fn validate_batch<R: Keyed>(batch: &[R]) -> DatasetResult<()> {
    match batch
        .windows(2)
        .position(|pair| pair[1].ticks() <= pair[0].ticks())
    {
        Some(i) => Err(DatasetError::UnsortedBatch {
            index: i + 1,
            previous: batch[i].ticks(),
            ticks: batch[i + 1].ticks(),
        }),
        None => Ok(()),
    }
}

/// Where a batch record belongs among the stored records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Placement {
    /// Lower-bound position among the stored records.
    position: u64,
    /// True if the stored record at `position` has the same ticks.
    collides: bool,
}

/// Merges `batch` into the first `count` records of `backend`.
///
/// `buffer_records` bounds how many stored records are read at once.
pub fn merge_insert<R, B>(
    backend: &mut B,
    count: u64,
    batch: &[R],
    policy: DuplicateTimeTicks,
    buffer_records: u64,
) -> DatasetResult<AddSummary>
where
    R: Record,
    B: StorageBackend<R> + ?Sized,
{
    validate_batch(batch)?;
    let buffer_records = buffer_records.max(1);
    if batch.is_empty() {
        return Ok(AddSummary::default());
    }

    if count == 0 {
        backend.insert_segment(0, batch)?;
        debug!(inserted = batch.len(), "added batch to empty dataset");
        return Ok(AddSummary {
            inserted: batch.len() as u64,
            ..AddSummary::default()
        });
    }

    let placements = locate(&*backend, count, batch, buffer_records)?;

    if policy == DuplicateTimeTicks::Fail {
        if let Some(i) = placements.iter().position(|p| p.collides) {
            let ticks = batch[i].ticks();
            warn!(ticks, "add rejected: duplicate ticks under fail policy");
            return Err(DatasetError::DuplicateTicks { ticks });
        }
    }

    let mut summary = AddSummary::default();
    let mut updates = Vec::new();
    let mut inserts = Vec::with_capacity(batch.len());
    for (placement, record) in placements.iter().zip(batch) {
        match (placement.collides, policy) {
            (false, _) => inserts.push((placement.position, *record)),
            (true, DuplicateTimeTicks::Update) => updates.push((placement.position, *record)),
            (true, _) => summary.skipped += 1,
        }
    }

    summary.updated = write_updates(backend, &updates)?;
    if !inserts.is_empty() {
        merge_backward(backend, count, &inserts, buffer_records)?;
        summary.inserted = inserts.len() as u64;
    }

    debug!(
        inserted = summary.inserted,
        updated = summary.updated,
        skipped = summary.skipped,
        %policy,
        "added batch"
    );
    Ok(summary)
}

fn locate<R, B>(
    backend: &B,
    count: u64,
    batch: &[R],
    buffer_records: u64,
) -> DatasetResult<Vec<Placement>>
where
    R: Record,
    B: StorageBackend<R> + ?Sized,
{
    let mut placements = Vec::with_capacity(batch.len());
    let (Some(first), Some(last)) = (batch.first(), batch.last()) else {
        return Ok(placements);
    };

    // Only stored records in [lo, hi) can collide with or sit between batch
    // records.
    let searcher = Searcher::new(backend, count, buffer_records);
    let lo = searcher.lower_bound(first.ticks())?;
    let last_ticks = last.ticks();
    let hi = searcher.partition_point(lo, count, |r| r.ticks() <= last_ticks)?;

    if hi - lo <= buffer_records {
        let window = if hi > lo {
            backend.read_segment(lo, hi - lo)?
        } else {
            Vec::new()
        };
        trace!(lo, hi, "locating batch in memory");

        let mut cursor = 0;
        for record in batch {
            let ticks = record.ticks();
            cursor += window[cursor..].partition_point(|r| r.ticks() < ticks);
            placements.push(Placement {
                position: lo + cursor as u64,
                collides: window.get(cursor).is_some_and(|r| r.ticks() == ticks),
            });
        }
    } else {
        trace!(lo, hi, "locating batch by probing");

        let narrowed = Searcher::new(backend, hi, buffer_records);
        let mut cursor = lo;
        for record in batch {
            let ticks = record.ticks();
            cursor = narrowed.lower_bound_from(cursor, ticks)?;
            let collides = cursor < hi && narrowed.record_at(cursor)?.ticks() == ticks;
            placements.push(Placement {
                position: cursor,
                collides,
            });
        }
    }

    Ok(placements)
}

/// Overwrites stored records in place, one write per contiguous run.
fn write_updates<R, B>(backend: &mut B, updates: &[(u64, R)]) -> DatasetResult<u64>
where
    R: Record,
    B: StorageBackend<R> + ?Sized,
{
    let mut start = 0;
    while start < updates.len() {
        let base = updates[start].0;
        let mut end = start + 1;
        while end < updates.len() && updates[end].0 == base + (end - start) as u64 {
            end += 1;
        }

        let run: Vec<R> = updates[start..end].iter().map(|(_, r)| *r).collect();
        backend.write_segment(base, &run)?;
        start = end;
    }
    Ok(updates.len() as u64)
}

/// Produces the merged sequence from the back.
struct BackwardMerge<'a, R> {
    /// New records with their lower-bound positions, ascending.
    inserts: &'a [(u64, R)],
    /// `inserts[..pending]` are not yet emitted.
    pending: usize,
    /// Stored records at `[.., old_end)` are not yet emitted.
    old_end: u64,
    /// Lowest stored position that moves.
    floor: u64,
    /// Cached stored records ending at `old_end`.
    chunk: Vec<R>,
    chunk_records: u64,
}

impl<'a, R: Record> BackwardMerge<'a, R> {
    fn new(inserts: &'a [(u64, R)], count: u64, chunk_records: u64) -> Self {
        Self {
            inserts,
            pending: inserts.len(),
            old_end: count,
            floor: inserts.first().map_or(count, |(position, _)| *position),
            chunk: Vec::new(),
            chunk_records,
        }
    }

    /// Returns the next record from the back, or `None` once every new record
    /// has been emitted. Stored records left over are already in place.
    fn next<B>(&mut self, backend: &B) -> DatasetResult<Option<R>>
    where
        B: StorageBackend<R> + ?Sized,
    {
        let Some(&(position, record)) = self.pending.checked_sub(1).map(|i| &self.inserts[i])
        else {
            return Ok(None);
        };

        if self.old_end <= position {
            self.pending -= 1;
            return Ok(Some(record));
        }

        if self.chunk.is_empty() {
            let start = self
                .old_end
                .saturating_sub(self.chunk_records)
                .max(self.floor);
            self.chunk = backend.read_segment(start, self.old_end - start)?;
        }
        let stored = self
            .chunk
            .pop()
            .ok_or_else(|| StorageError::out_of_bounds(self.old_end - 1, 1, self.old_end))?;
        self.old_end -= 1;
        Ok(Some(stored))
    }
}

fn merge_backward<R, B>(
    backend: &mut B,
    count: u64,
    inserts: &[(u64, R)],
    buffer_records: u64,
) -> DatasetResult<()>
where
    R: Record,
    B: StorageBackend<R> + ?Sized,
{
    let added = inserts.len();
    let mut merge = BackwardMerge::new(inserts, count, buffer_records);

    // The last `added` merged records fill the grown area.
    let mut grown = Vec::with_capacity(added);
    while grown.len() < added {
        match merge.next(&*backend)? {
            Some(record) => grown.push(record),
            None => break,
        }
    }
    grown.reverse();
    backend.insert_segment(count, &grown)?;
    trace!(at = count, count = grown.len(), "grew dataset");

    let run_len = buffer_records as usize;
    let mut run = Vec::with_capacity(run_len.min(count as usize));
    let mut run_end = count;
    while let Some(record) = merge.next(&*backend)? {
        run.push(record);
        if run.len() == run_len {
            run_end = write_run(backend, run_end, &mut run)?;
        }
    }
    if !run.is_empty() {
        write_run(backend, run_end, &mut run)?;
    }
    Ok(())
}

/// Writes a back-to-front run so that it ends at `end`; returns its start.
fn write_run<R, B>(backend: &mut B, end: u64, run: &mut Vec<R>) -> DatasetResult<u64>
where
    R: Record,
    B: StorageBackend<R> + ?Sized,
{
    run.reverse();
    let start = end - run.len() as u64;
    backend.write_segment(start, run)?;
    trace!(start, count = run.len(), "rewrote shifted run");
    run.clear();
    Ok(start)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tickvault_common::Scalar;
    use tickvault_storage::MemoryBackend;

    fn backend(pairs: &[(i64, f64)]) -> MemoryBackend<Scalar> {
        MemoryBackend::with_records(pairs.iter().map(|&(t, v)| Scalar::new(t, v)).collect())
    }

    fn batch(pairs: &[(i64, f64)]) -> Vec<Scalar> {
        pairs.iter().map(|&(t, v)| Scalar::new(t, v)).collect()
    }

    fn add(
        backend: &mut MemoryBackend<Scalar>,
        records: &[Scalar],
        policy: DuplicateTimeTicks,
        buffer_records: u64,
    ) -> DatasetResult<AddSummary> {
        let count = backend.records().len() as u64;
        merge_insert(backend, count, records, policy, buffer_records)
    }

    fn values(backend: &MemoryBackend<Scalar>) -> Vec<f64> {
        backend.records().iter().map(|r| r.value).collect()
    }

    fn ticks(backend: &MemoryBackend<Scalar>) -> Vec<i64> {
        backend.records().iter().map(|r| r.ticks).collect()
    }

    #[test]
    fn test_validate_batch() {
        assert!(validate_batch::<Scalar>(&[]).is_ok());
        assert!(validate_batch(&batch(&[(1, 0.0), (2, 0.0)])).is_ok());
        let err = validate_batch(&batch(&[(1, 0.0), (3, 0.0), (3, 0.0)])).unwrap_err();
        assert!(matches!(
            err,
            DatasetError::UnsortedBatch { index: 2, previous: 3, ticks: 3 }
        ));
    }

    #[test]
    fn test_fail_policy_is_atomic() {
        let original = [(100, 1.0), (110, 1.1), (130, 1.3), (150, 1.5)];
        for buffer in [1, 2, 1024] {
            let mut b = backend(&original);
            let err = add(&mut b, &batch(&[(100, 1.01)]), DuplicateTimeTicks::Fail, buffer)
                .unwrap_err();
            assert!(matches!(err, DatasetError::DuplicateTicks { ticks: 100 }));
            assert_eq!(b.records(), batch(&original).as_slice());

            // A collision late in the batch still leaves everything untouched.
            let err = add(
                &mut b,
                &batch(&[(90, 0.9), (120, 1.2), (150, 1.55)]),
                DuplicateTimeTicks::Fail,
                buffer,
            )
            .unwrap_err();
            assert!(err.is_duplicate());
            assert_eq!(b.records(), batch(&original).as_slice());
        }
    }

    #[test]
    fn test_skip_and_update() {
        let existing = [(2, 2.1), (4, 4.1), (6, 6.1)];
        let incoming = batch(&[(1, 1.2), (2, 2.2), (4, 4.2), (7, 7.2)]);

        for buffer in [1, 2, 1024] {
            let mut b = backend(&existing);
            let summary = add(&mut b, &incoming, DuplicateTimeTicks::Skip, buffer).unwrap();
            assert_eq!(values(&b), vec![1.2, 2.1, 4.1, 6.1, 7.2]);
            assert_eq!(
                summary,
                AddSummary { inserted: 2, updated: 0, skipped: 2 }
            );

            let mut b = backend(&existing);
            let summary = add(&mut b, &incoming, DuplicateTimeTicks::Update, buffer).unwrap();
            assert_eq!(values(&b), vec![1.2, 2.2, 4.2, 6.1, 7.2]);
            assert_eq!(
                summary,
                AddSummary { inserted: 2, updated: 2, skipped: 0 }
            );
        }
    }

    #[test]
    fn test_prepend_append_and_interior() {
        for buffer in [1, 3, 1024] {
            let mut b = backend(&[(10, 0.0), (20, 0.0), (30, 0.0)]);
            let summary = add(
                &mut b,
                &batch(&[(1, 0.0), (2, 0.0), (15, 0.0), (25, 0.0), (26, 0.0), (40, 0.0)]),
                DuplicateTimeTicks::Fail,
                buffer,
            )
            .unwrap();
            assert_eq!(summary.inserted, 6);
            assert_eq!(ticks(&b), vec![1, 2, 10, 15, 20, 25, 26, 30, 40]);
        }
    }

    #[test]
    fn test_append_only() {
        let mut b = backend(&[(1, 0.0), (2, 0.0)]);
        add(&mut b, &batch(&[(3, 0.0), (4, 0.0)]), DuplicateTimeTicks::Fail, 1).unwrap();
        assert_eq!(ticks(&b), vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_into_empty_and_empty_batch() {
        let mut b = backend(&[]);
        let summary = add(&mut b, &batch(&[(5, 0.5), (6, 0.6)]), DuplicateTimeTicks::Fail, 8)
            .unwrap();
        assert_eq!(summary.inserted, 2);
        assert_eq!(ticks(&b), vec![5, 6]);

        let summary = add(&mut b, &[], DuplicateTimeTicks::Fail, 8).unwrap();
        assert_eq!(summary, AddSummary::default());
    }

    #[test]
    fn test_unsorted_batch_rejected_before_write() {
        let mut b = backend(&[(10, 0.0)]);
        let err = add(
            &mut b,
            &batch(&[(5, 0.0), (4, 0.0)]),
            DuplicateTimeTicks::Update,
            8,
        )
        .unwrap_err();
        assert!(matches!(err, DatasetError::UnsortedBatch { index: 1, .. }));
        assert_eq!(ticks(&b), vec![10]);
    }

    #[test]
    fn test_wide_interleave_with_small_buffer() {
        let stored: Vec<(i64, f64)> = (0..50).map(|i| (i * 10, i as f64)).collect();
        let incoming: Vec<(i64, f64)> = (0..60).map(|i| (i * 9 + 1, -1.0)).collect();

        let mut expected: Vec<i64> = stored
            .iter()
            .map(|p| p.0)
            .chain(incoming.iter().map(|p| p.0))
            .collect();
        expected.sort_unstable();
        expected.dedup();

        for buffer in [1, 4, 7, 1024] {
            let mut b = backend(&stored);
            let summary = add(&mut b, &batch(&incoming), DuplicateTimeTicks::Skip, buffer).unwrap();
            assert_eq!(ticks(&b), expected);
            assert_eq!(summary.total(), 60);
            assert_eq!(summary.inserted + 50, expected.len() as u64);
        }
    }
}
