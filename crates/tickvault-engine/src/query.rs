//! Range queries.

use tickvault_common::Record;
use tickvault_storage::StorageBackend;
use tracing::trace;

use crate::error::DatasetResult;
use crate::index::{Searcher, Span};

/// Substitutes unbounded limits for zero tick bounds.
///
/// `(0, 0)` selects everything, `(t, 0)` everything from `t` on and `(0, t)`
/// everything up to `t`.
#[must_use]
pub fn unbounded_ticks(from: i64, to: i64) -> (i64, i64) {
    (
        if from == 0 { i64::MIN } else { from },
        if to == 0 { i64::MAX } else { to },
    )
}

/// Resolves a query tick range, zero bounds meaning unbounded.
pub fn tick_span<R, B>(searcher: &Searcher<'_, R, B>, from: i64, to: i64) -> DatasetResult<Span>
where
    R: Record,
    B: StorageBackend<R> + ?Sized,
{
    let (from, to) = unbounded_ticks(from, to);
    if from > to {
        return Ok(Span::EMPTY);
    }
    Ok(searcher.ticks_index_range(from, to)?.into())
}

/// Resolves `count` records from `from`, clamped to the end of the dataset.
#[must_use]
pub fn index_span(from: u64, count: u64, total: u64) -> Span {
    if from >= total {
        Span::EMPTY
    } else {
        Span::new(from, count.min(total - from))
    }
}

/// Calls `f` for every record of `span` in ascending order.
///
/// Records are read `buffer_records` at a time. Returns the number of
/// records visited.
pub fn stream<R, B, F>(backend: &B, span: Span, buffer_records: u64, mut f: F) -> DatasetResult<u64>
where
    R: Record,
    B: StorageBackend<R> + ?Sized,
    F: FnMut(&R),
{
    let step = buffer_records.max(1);
    let mut offset = span.start;
    while offset < span.end() {
        let n = step.min(span.end() - offset);
        let chunk = backend.read_segment(offset, n)?;
        trace!(offset, count = n, "streaming chunk");
        chunk.iter().for_each(&mut f);
        offset += n;
    }
    Ok(span.len)
}

/// Appends the records of `span` to `out`.
///
/// On failure `out` is restored to its previous length.
pub fn collect_into<R, B>(
    backend: &B,
    span: Span,
    buffer_records: u64,
    out: &mut Vec<R>,
) -> DatasetResult<u64>
where
    R: Record,
    B: StorageBackend<R> + ?Sized,
{
    let before = out.len();
    out.reserve(span.len.min(buffer_records.max(1)) as usize);
    stream(backend, span, buffer_records, |r| out.push(*r)).map_err(|e| {
        out.truncate(before);
        e
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tickvault_common::Scalar;
    use tickvault_storage::MemoryBackend;

    fn backend(ticks: &[i64]) -> MemoryBackend<Scalar> {
        MemoryBackend::with_records(ticks.iter().map(|&t| Scalar::new(t, t as f64)).collect())
    }

    #[test]
    fn test_unbounded_ticks() {
        assert_eq!(unbounded_ticks(0, 0), (i64::MIN, i64::MAX));
        assert_eq!(unbounded_ticks(5, 0), (5, i64::MAX));
        assert_eq!(unbounded_ticks(0, 5), (i64::MIN, 5));
        assert_eq!(unbounded_ticks(3, 7), (3, 7));
    }

    #[test]
    fn test_tick_span() {
        let b = backend(&[10, 20, 30, 40]);
        let s = Searcher::new(&b, 4, 2);
        assert_eq!(tick_span(&s, 0, 0).unwrap(), Span::new(0, 4));
        assert_eq!(tick_span(&s, 20, 0).unwrap(), Span::new(1, 3));
        assert_eq!(tick_span(&s, 0, 25).unwrap(), Span::new(0, 2));
        assert_eq!(tick_span(&s, 35, 15).unwrap(), Span::EMPTY);
        assert_eq!(tick_span(&s, 41, 50).unwrap(), Span::EMPTY);
    }

    #[test]
    fn test_index_span() {
        assert_eq!(index_span(1, 2, 4), Span::new(1, 2));
        assert_eq!(index_span(2, 100, 4), Span::new(2, 2));
        assert_eq!(index_span(4, 1, 4), Span::EMPTY);
        assert_eq!(index_span(0, 0, 4).len, 0);
    }

    #[test]
    fn test_stream_in_chunks() {
        let b = backend(&[1, 2, 3, 4, 5, 6, 7]);
        let mut seen = Vec::new();
        let n = stream(&b, Span::new(1, 5), 2, |r: &Scalar| seen.push(r.ticks)).unwrap();
        assert_eq!(n, 5);
        assert_eq!(seen, vec![2, 3, 4, 5, 6]);
    }

    #[test]
    fn test_collect_restores_on_error() {
        let b = backend(&[1, 2, 3]);
        let mut out = vec![Scalar::new(-1, 0.0)];
        assert!(collect_into(&b, Span::new(2, 5), 1, &mut out).is_err());
        assert_eq!(out, vec![Scalar::new(-1, 0.0)]);

        assert_eq!(collect_into(&b, Span::new(0, 3), 2, &mut out).unwrap(), 3);
        assert_eq!(out.len(), 4);
    }
}
