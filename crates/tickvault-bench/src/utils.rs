//! Benchmark utilities and helpers.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tickvault_common::types::ticks::TICKS_PER_MINUTE;
use tickvault_common::{Ohlcv, Scalar};

/// Generates `count` scalars one minute apart, starting at `start`.
pub fn generate_scalars(count: usize, start: i64) -> Vec<Scalar> {
    let mut rng = StdRng::seed_from_u64(42);
    (0..count as i64)
        .map(|i| Scalar::new(start + i * TICKS_PER_MINUTE, rng.gen_range(0.0..100.0)))
        .collect()
}

/// Generates two batches whose ticks interleave: the first holds even
/// minutes, the second odd minutes.
pub fn generate_interleaved(count: usize) -> (Vec<Scalar>, Vec<Scalar>) {
    let mut rng = StdRng::seed_from_u64(42);
    let mut even = Vec::with_capacity(count);
    let mut odd = Vec::with_capacity(count);
    for i in 0..count as i64 {
        even.push(Scalar::new(2 * i * TICKS_PER_MINUTE, rng.gen()));
        odd.push(Scalar::new((2 * i + 1) * TICKS_PER_MINUTE, rng.gen()));
    }
    (even, odd)
}

/// Generates a random walk of one-minute bars.
pub fn generate_bars(count: usize) -> Vec<Ohlcv> {
    let mut rng = StdRng::seed_from_u64(42);
    let mut close = 100.0_f64;
    (0..count as i64)
        .map(|i| {
            let open = close;
            close = (open + rng.gen_range(-1.0..1.0)).max(1.0);
            let high = open.max(close) + rng.gen_range(0.0..0.5);
            let low = open.min(close) - rng.gen_range(0.0..0.5);
            let volume = rng.gen_range(100.0..10_000.0);
            Ohlcv::new((i + 1) * TICKS_PER_MINUTE, open, high, low, close, volume)
        })
        .collect()
}

/// Generates random tick ranges inside `[0, span)`.
pub fn generate_tick_ranges(count: usize, span: i64, width: i64) -> Vec<(i64, i64)> {
    let mut rng = StdRng::seed_from_u64(42);
    (0..count)
        .map(|_| {
            let from = rng.gen_range(1..span.max(2));
            (from, from + width)
        })
        .collect()
}
