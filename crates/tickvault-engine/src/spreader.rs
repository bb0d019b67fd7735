//! Duplicate tick spreading.

use tickvault_common::Keyed;

/// Makes a tick-grouped batch strictly ascending by nudging ties forward.
///
/// Scans left to right and, whenever a record's ticks are not greater than
/// its predecessor's, sets them to the predecessor's ticks plus one. A run of
/// `n` equal ticks becomes `n` consecutive ticks, and the shift cascades into
/// later records that the run catches up with. Ticks only ever increase and
/// records are never reordered.
///
/// Returns `true` if any ticks changed. Applying it to its own output
/// returns `false`.
///
/// Ties at `i64::MAX` have no room to spread and are left as they are, so
/// the batch stays unsorted and an add rejects it with
/// [`UnsortedBatch`](crate::DatasetError::UnsortedBatch).
///
/// # Example
///
/// ```rust
/// use tickvault_common::{Keyed, Scalar};
/// use tickvault_engine::spread_duplicate_time_ticks;
///
/// let mut batch = vec![Scalar::new(1000, 1.0), Scalar::new(1000, 2.0), Scalar::new(1001, 3.0)];
/// assert!(spread_duplicate_time_ticks(&mut batch));
/// let ticks: Vec<i64> = batch.iter().map(|r| r.ticks()).collect();
/// assert_eq!(ticks, vec![1000, 1001, 1002]);
/// assert!(!spread_duplicate_time_ticks(&mut batch));
/// ```
pub fn spread_duplicate_time_ticks<R: Keyed>(records: &mut [R]) -> bool {
    let mut changed = false;
    for i in 1..records.len() {
        let previous = records[i - 1].ticks();
        let current = records[i].ticks();
        if current <= previous {
            // Saturates at i64::MAX.
            let spread = previous.saturating_add(1);
            if spread != current {
                records[i] = records[i].with_ticks(spread);
                changed = true;
            }
        }
    }
    changed
}
