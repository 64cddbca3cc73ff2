//! Benchmarks for the scheduler crate.

use criterion::{Criterion, criterion_group, criterion_main};
use litmus_scheduler::{RTSetup, SporadicTask};
use std::hint::black_box;

fn bench_to_params(c: &mut Criterion) {
    let task = SporadicTask::ns(10_000_000, 100_000_000, 0).with_cluster(1, 4);

    c.bench_function("sporadic_to_params", |b| {
        b.iter(|| black_box(black_box(&task).to_params(black_box(4))));
    });
}

fn bench_ms_conversion(c: &mut Criterion) {
    c.bench_function("sporadic_ms", |b| {
        b.iter(|| black_box(SporadicTask::ms(black_box(10), black_box(100), black_box(0))));
    });
}

fn bench_memory_lock_flags(c: &mut Criterion) {
    let setup = RTSetup::default();

    c.bench_function("rt_setup_memory_lock_flags", |b| {
        b.iter(|| black_box(black_box(&setup).memory_lock_flags()));
    });
}

criterion_group!(
    benches,
    bench_to_params,
    bench_ms_conversion,
    bench_memory_lock_flags
);
criterion_main!(benches);
