use std::sync::Once;

use tempfile::TempDir;
use tickvault_common::{Keyed, Ohlcv, Quote, Record, Scalar, StoreConfig, Trade};
use tickvault_storage::Container;
use tracing_subscriber::EnvFilter;

static TRACING: Once = Once::new();

/// Installs a test subscriber once per process.
///
/// The filter comes from `RUST_LOG` and defaults to `warn`.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
    });
}

/// A container in a temporary directory, removed on drop.
pub struct TempContainer {
    /// The container.
    pub container: Container,
    _dir: TempDir,
}

impl TempContainer {
    /// Creates a container with default settings.
    pub fn new() -> Self {
        Self::with_config(|config| config)
    }

    /// Creates a container, letting the caller adjust its configuration.
    pub fn with_config(adjust: impl FnOnce(StoreConfig) -> StoreConfig) -> Self {
        init_tracing();
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        let config = adjust(StoreConfig::with_root_dir(dir.path()));
        let container = Container::new(config).expect("invalid store config");
        Self {
            container,
            _dir: dir,
        }
    }
}

impl Default for TempContainer {
    fn default() -> Self {
        Self::new()
    }
}

/// Builds scalars from `(ticks, value)` pairs.
pub fn scalars(pairs: &[(i64, f64)]) -> Vec<Scalar> {
    pairs.iter().map(|&(t, v)| Scalar::new(t, v)).collect()
}

/// Builds one trade per tick with a price derived from the tick.
pub fn trades(ticks: &[i64]) -> Vec<Trade> {
    ticks
        .iter()
        .map(|&t| Trade::new(t, 100.0 + t as f64 / 100.0, 1.0))
        .collect()
}

/// Builds one quote per tick around a mid derived from the tick.
pub fn quotes(ticks: &[i64]) -> Vec<Quote> {
    ticks
        .iter()
        .map(|&t| {
            let mid = 50.0 + t as f64 / 1000.0;
            Quote::new(t, mid - 0.01, mid + 0.01, 100.0, 200.0)
        })
        .collect()
}

/// Builds one bar per tick.
pub fn bars(ticks: &[i64]) -> Vec<Ohlcv> {
    ticks
        .iter()
        .map(|&t| {
            let open = t as f64;
            Ohlcv::new(t, open, open + 2.0, open - 1.0, open + 1.0, 1000.0)
        })
        .collect()
}

/// Returns the ticks of `records`.
pub fn ticks_of<R: Keyed>(records: &[R]) -> Vec<i64> {
    records.iter().map(Keyed::ticks).collect()
}

/// Asserts that `records` are strictly ascending by ticks.
pub fn assert_strictly_ascending<R: Record>(records: &[R]) {
    for (i, pair) in records.windows(2).enumerate() {
        assert!(
            pair[0].ticks() < pair[1].ticks(),
            "ticks not strictly ascending at {}: {} then {}",
            i + 1,
            pair[0].ticks(),
            pair[1].ticks()
        );
    }
}
