//! Range deletes.
//!
//! Each delete resolves to a single span of positions, which is then removed
//! with one backend call.

use tickvault_common::Record;
use tickvault_storage::StorageBackend;

use crate::error::{DatasetError, DatasetResult};
use crate::index::{Searcher, Span};

/// Resolves the inclusive index range `[first, last]`.
pub fn index_range_span(first: u64, last: u64, count: u64) -> DatasetResult<Span> {
    if last >= count {
        return Err(DatasetError::index_out_of_range(last, count));
    }
    if first > last {
        return Err(DatasetError::InvalidRange { first, last });
    }
    Ok(Span::new(first, last - first + 1))
}

/// Resolves `[0, index]`; fails when `index` is not a stored position.
pub fn before_index_span(index: u64, count: u64) -> DatasetResult<Span> {
    index_range_span(0, index, count)
}

/// Resolves `[index, count)`; empty when `index` is past the end.
#[must_use]
pub fn after_index_span(index: u64, count: u64) -> Span {
    if index >= count {
        Span::EMPTY
    } else {
        Span::new(index, count - index)
    }
}

/// Resolves every record with ticks at or before `ticks`.
pub fn before_tick_span<R, B>(searcher: &Searcher<'_, R, B>, ticks: i64) -> DatasetResult<Span>
where
    R: Record,
    B: StorageBackend<R> + ?Sized,
{
    Ok(Span::new(0, searcher.upper_bound(ticks)?))
}

/// Resolves every record with ticks at or after `ticks`.
pub fn after_tick_span<R, B>(searcher: &Searcher<'_, R, B>, ticks: i64) -> DatasetResult<Span>
where
    R: Record,
    B: StorageBackend<R> + ?Sized,
{
    let start = searcher.lower_bound(ticks)?;
    Ok(Span::new(start, searcher.count() - start))
}

/// Resolves every record with ticks in `[from, to]`.
pub fn tick_range_span<R, B>(
    searcher: &Searcher<'_, R, B>,
    from: i64,
    to: i64,
) -> DatasetResult<Span>
where
    R: Record,
    B: StorageBackend<R> + ?Sized,
{
    Ok(searcher.ticks_index_range(from, to)?.into())
}

/// Removes `span` from the backend and returns the number of records removed.
pub fn delete_span<R, B>(backend: &mut B, span: Span) -> DatasetResult<u64>
where
    R: Record,
    B: StorageBackend<R> + ?Sized,
{
    if span.is_empty() {
        return Ok(0);
    }
    backend.delete_segment(span.start, span.len)?;
    Ok(span.len)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tickvault_common::Scalar;
    use tickvault_storage::MemoryBackend;

    fn backend(ticks: &[i64]) -> MemoryBackend<Scalar> {
        MemoryBackend::with_records(ticks.iter().map(|&t| Scalar::new(t, 0.0)).collect())
    }

    #[test]
    fn test_index_range_span() {
        assert_eq!(index_range_span(1, 3, 5).unwrap(), Span::new(1, 3));
        assert_eq!(index_range_span(0, 4, 5).unwrap(), Span::new(0, 5));
        assert!(matches!(
            index_range_span(0, 5, 5),
            Err(DatasetError::IndexOutOfRange { index: 5, count: 5 })
        ));
        assert!(matches!(
            index_range_span(3, 1, 5),
            Err(DatasetError::InvalidRange { first: 3, last: 1 })
        ));
        assert!(index_range_span(0, 0, 0).is_err());
    }

    #[test]
    fn test_index_cuts_are_asymmetric() {
        assert_eq!(before_index_span(2, 5).unwrap(), Span::new(0, 3));
        assert!(before_index_span(5, 5).is_err());

        assert_eq!(after_index_span(2, 5), Span::new(2, 3));
        assert_eq!(after_index_span(5, 5), Span::EMPTY);
        assert_eq!(after_index_span(9, 5), Span::EMPTY);
    }

    #[test]
    fn test_tick_spans() {
        let b = backend(&[10, 20, 30, 40, 50]);
        let s = Searcher::new(&b, 5, 2);

        assert_eq!(before_tick_span(&s, 30).unwrap(), Span::new(0, 3));
        assert_eq!(before_tick_span(&s, 35).unwrap(), Span::new(0, 3));
        assert_eq!(before_tick_span(&s, 5).unwrap(), Span::new(0, 0));
        assert_eq!(after_tick_span(&s, 30).unwrap(), Span::new(2, 3));
        assert_eq!(after_tick_span(&s, 55).unwrap(), Span::new(5, 0));
        assert_eq!(tick_range_span(&s, 15, 45).unwrap(), Span::new(1, 3));
        assert_eq!(tick_range_span(&s, 21, 29).unwrap(), Span::EMPTY);
    }

    #[test]
    fn test_delete_span() {
        let mut b = backend(&[0, 1, 2, 3, 4]);
        assert_eq!(delete_span(&mut b, Span::new(1, 3)).unwrap(), 3);
        let ticks: Vec<i64> = b.records().iter().map(|r| r.ticks).collect();
        assert_eq!(ticks, vec![0, 4]);
        assert_eq!(delete_span(&mut b, Span::EMPTY).unwrap(), 0);
    }
}
