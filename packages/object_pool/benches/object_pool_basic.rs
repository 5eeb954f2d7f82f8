//! Basic benchmarks for the `object_pool` crate.
#![allow(
    missing_docs,
    reason = "No need for API documentation in benchmark code"
)]

use std::hint::black_box;
use std::time::{Duration, Instant};

use criterion::{Criterion, criterion_group, criterion_main};
use object_pool::{ObjectPool, RawObjectPool};

criterion_group!(benches, entrypoint);
criterion_main!(benches);

const BATCH_SIZE: usize = 100;

fn entrypoint(c: &mut Criterion) {
    let mut group = c.benchmark_group("object_pool_basic");

    group.bench_function("raw_insert_one", |b| {
        let mut pool = RawObjectPool::new();

        b.iter(|| {
            black_box(pool.insert(black_box(1024_usize)));
        });
    });

    group.bench_function("shared_insert_one", |b| {
        let pool = ObjectPool::new();

        b.iter(|| {
            black_box(pool.insert(black_box(1024_usize)));
        });
    });

    group.bench_function("raw_clear_batch", |b| {
        b.iter_custom(|iters| {
            let mut pool = RawObjectPool::builder().capacity(BATCH_SIZE).build_raw();
            let mut elapsed = Duration::ZERO;

            for _ in 0..iters {
                for value in 0..BATCH_SIZE {
                    pool.insert(value.to_string());
                }

                let start = Instant::now();
                pool.clear();
                elapsed += start.elapsed();
            }

            elapsed
        });
    });

    group.bench_function("shared_clear_batch", |b| {
        b.iter_custom(|iters| {
            let pool = ObjectPool::new();
            let mut elapsed = Duration::ZERO;

            for _ in 0..iters {
                for value in 0..BATCH_SIZE {
                    pool.insert(value.to_string());
                }

                let start = Instant::now();
                pool.clear();
                elapsed += start.elapsed();
            }

            elapsed
        });
    });

    group.bench_function("shared_acquire_batch", |b| {
        b.iter_custom(|iters| {
            let parent = ObjectPool::new();
            let child = ObjectPool::new();
            let mut elapsed = Duration::ZERO;

            for _ in 0..iters {
                for value in 0..BATCH_SIZE {
                    child.insert(value);
                }

                let start = Instant::now();
                parent.acquire_data(&child);
                elapsed += start.elapsed();
            }

            elapsed
        });
    });

    group.finish();
}
