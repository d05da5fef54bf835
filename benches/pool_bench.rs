//! Pool performance benchmarks

// Benchmarks are not production code - unwrap/expect are acceptable here
#![allow(clippy::unwrap_used, clippy::expect_used)]

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use fixed_pool::FixedPool;

const BENCH_CAPACITY: usize = 1024;

fn bench_fixed_pool(c: &mut Criterion) {
    let mut group = c.benchmark_group("fixed_pool");

    // Fast path: every allocation reuses the slot freed one step earlier.
    group.bench_function("reuse_cycle", |b| {
        let mut pool: FixedPool<u64> = FixedPool::with_capacity(BENCH_CAPACITY).unwrap();

        b.iter(|| {
            let slot = pool.allocate(1).unwrap().unwrap();
            unsafe {
                pool.construct(slot, 42);
                black_box(slot.as_ref());
                pool.deallocate(slot, 1).unwrap();
            }
        });
    });

    // Scan path: fill the whole pool, then drain it.
    group.bench_function("fill_drain", |b| {
        let mut pool: FixedPool<u64> = FixedPool::with_capacity(BENCH_CAPACITY).unwrap();
        let mut slots = Vec::with_capacity(BENCH_CAPACITY);

        b.iter(|| {
            for i in 0..BENCH_CAPACITY {
                let slot = pool.allocate(1).unwrap().unwrap();
                unsafe { pool.construct(slot, i as u64) };
                slots.push(slot);
            }
            for slot in slots.drain(..) {
                unsafe { pool.deallocate(slot, 1).unwrap() };
            }
        });
    });

    group.finish();
}

criterion_group!(benches, bench_fixed_pool);
criterion_main!(benches);
