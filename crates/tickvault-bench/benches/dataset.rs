//! Dataset benchmarks for tickvault.
//!
//! Benchmarks for:
//! - Appending batches
//! - Merging interleaved batches, in memory and on disk
//! - Tick range fetches
//! - Range deletes

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use tickvault_bench::utils::{
    generate_bars, generate_interleaved, generate_scalars, generate_tick_ranges,
};
use tickvault_common::types::ticks::TICKS_PER_MINUTE;
use tickvault_common::{DatasetConfig, DuplicateTimeTicks, Ohlcv, Scalar};
use tickvault_engine::Dataset;
use tickvault_storage::{FileBackend, MemoryBackend};

type MemoryDataset<R> = Dataset<R, MemoryBackend<R>>;

/// Benchmark appending one batch per iteration to an empty dataset.
fn bench_add_append(c: &mut Criterion) {
    let mut group = c.benchmark_group("dataset/add_append");

    for size in [1000, 10_000, 100_000].iter() {
        let bars = generate_bars(*size);

        group.throughput(Throughput::Elements(*size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| {
                let mut dataset: MemoryDataset<Ohlcv> = Dataset::in_memory();
                dataset.add(&bars, DuplicateTimeTicks::Fail).unwrap();
                black_box(dataset.count())
            });
        });
    }

    group.finish();
}

/// Benchmark merging a batch whose ticks interleave with every stored record.
fn bench_add_interleaved(c: &mut Criterion) {
    let mut group = c.benchmark_group("dataset/add_interleaved");

    for size in [1000, 10_000, 50_000].iter() {
        let (even, odd) = generate_interleaved(*size);

        group.throughput(Throughput::Elements(*size as u64));
        group.bench_with_input(BenchmarkId::new("memory", size), size, |b, _| {
            b.iter(|| {
                let mut dataset = MemoryDataset::from_records(even.clone()).unwrap();
                dataset.add(&odd, DuplicateTimeTicks::Fail).unwrap();
                black_box(dataset.count())
            });
        });

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("interleaved.tvd");
        let config = DatasetConfig::default().with_sync_on_flush(false);
        group.bench_with_input(BenchmarkId::new("file", size), size, |b, _| {
            b.iter(|| {
                let backend = FileBackend::<Scalar>::create(&path).unwrap();
                let mut dataset = Dataset::new(backend, &config).unwrap();
                dataset.add(&even, DuplicateTimeTicks::Fail).unwrap();
                dataset.add(&odd, DuplicateTimeTicks::Fail).unwrap();
                dataset.close().unwrap();
            });
        });
    }

    group.finish();
}

/// Benchmark Update-policy adds that overwrite every stored record.
fn bench_add_update(c: &mut Criterion) {
    let mut group = c.benchmark_group("dataset/add_update");

    for size in [1000, 10_000].iter() {
        let records = generate_scalars(*size, TICKS_PER_MINUTE);
        let mut dataset = MemoryDataset::from_records(records.clone()).unwrap();

        group.throughput(Throughput::Elements(*size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| {
                let summary = dataset.add(&records, DuplicateTimeTicks::Update).unwrap();
                black_box(summary.updated)
            });
        });
    }

    group.finish();
}

/// Benchmark tick range fetches with different read buffer sizes.
fn bench_fetch_tick_range(c: &mut Criterion) {
    let mut group = c.benchmark_group("dataset/fetch_tick_range");
    let size = 100_000;
    let records = generate_scalars(size, TICKS_PER_MINUTE);
    let ranges = generate_tick_ranges(100, size as i64 * TICKS_PER_MINUTE, 1000 * TICKS_PER_MINUTE);

    for buffer_bytes in [256, 16 * 1024, 1024 * 1024].iter() {
        let mut dataset = MemoryDataset::from_records(records.clone()).unwrap();
        dataset.set_maximum_read_buffer_bytes(*buffer_bytes);

        group.throughput(Throughput::Elements(ranges.len() as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(buffer_bytes),
            buffer_bytes,
            |b, _| {
                let mut out = Vec::with_capacity(1024);
                b.iter(|| {
                    let mut fetched = 0;
                    for &(from, to) in &ranges {
                        out.clear();
                        fetched += dataset.fetch_tick_range(&mut out, from, to).unwrap();
                    }
                    black_box(fetched)
                });
            },
        );
    }

    group.finish();
}

/// Benchmark deleting the middle half of a dataset.
fn bench_delete_tick_range(c: &mut Criterion) {
    let mut group = c.benchmark_group("dataset/delete_tick_range");

    for size in [10_000, 100_000].iter() {
        let records = generate_scalars(*size, TICKS_PER_MINUTE);
        let from = records[*size / 4].ticks;
        let to = records[*size * 3 / 4].ticks;

        group.throughput(Throughput::Elements(*size as u64 / 2));
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| {
                let mut dataset = MemoryDataset::from_records(records.clone()).unwrap();
                black_box(dataset.delete_tick_range(from, to).unwrap())
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_add_append,
    bench_add_interleaved,
    bench_add_update,
    bench_fetch_tick_range,
    bench_delete_tick_range,
);

criterion_main!(benches);
