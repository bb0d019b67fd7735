//! A dataset kept in a `BTreeMap`, used as the expected state in
//! randomized checks.

use std::collections::BTreeMap;

use tickvault_common::{DuplicateTimeTicks, Record};
use tickvault_engine::AddSummary;

/// Ordered map from ticks to record with the same add and delete semantics
/// as a dataset.
#[derive(Debug, Clone, Default)]
pub struct ReferenceModel<R> {
    records: BTreeMap<i64, R>,
}

impl<R: Record> ReferenceModel<R> {
    /// Creates an empty model.
    pub fn new() -> Self {
        Self {
            records: BTreeMap::new(),
        }
    }

    /// Number of records.
    pub fn len(&self) -> u64 {
        self.records.len() as u64
    }

    /// Returns true if the model holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// All records in ascending order.
    pub fn records(&self) -> Vec<R> {
        self.records.values().copied().collect()
    }

    /// Records with ticks in `[from, to]`.
    pub fn range(&self, from: i64, to: i64) -> Vec<R> {
        if from > to {
            return Vec::new();
        }
        self.records.range(from..=to).map(|(_, r)| *r).collect()
    }

    /// Applies a strictly ascending batch.
    ///
    /// Returns `None` when the Fail policy rejects the batch, in which case
    /// the model is unchanged.
    pub fn add(&mut self, batch: &[R], policy: DuplicateTimeTicks) -> Option<AddSummary> {
        let mut summary = AddSummary::default();
        if policy == DuplicateTimeTicks::Fail
            && batch.iter().any(|r| self.records.contains_key(&r.ticks()))
        {
            return None;
        }
        for record in batch {
            match self.records.get_mut(&record.ticks()) {
                None => {
                    self.records.insert(record.ticks(), *record);
                    summary.inserted += 1;
                }
                Some(stored) => match policy {
                    DuplicateTimeTicks::Update => {
                        *stored = *record;
                        summary.updated += 1;
                    }
                    DuplicateTimeTicks::Skip => summary.skipped += 1,
                    DuplicateTimeTicks::Fail => unreachable!("collisions checked above"),
                },
            }
        }
        Some(summary)
    }

    /// Removes records with ticks in `[from, to]`. Returns the number removed.
    pub fn delete_tick_range(&mut self, from: i64, to: i64) -> u64 {
        if from > to {
            return 0;
        }
        let doomed: Vec<i64> = self.records.range(from..=to).map(|(t, _)| *t).collect();
        for ticks in &doomed {
            self.records.remove(ticks);
        }
        doomed.len() as u64
    }

    /// Removes indices `[first, last]`, clamped to the stored records.
    pub fn delete_index_range(&mut self, first: u64, last: u64) -> u64 {
        let doomed: Vec<i64> = self
            .records
            .keys()
            .enumerate()
            .filter(|(i, _)| (first..=last).contains(&(*i as u64)))
            .map(|(_, t)| *t)
            .collect();
        for ticks in &doomed {
            self.records.remove(ticks);
        }
        doomed.len() as u64
    }
}
