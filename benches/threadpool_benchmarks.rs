use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::hint::black_box;
use waitpool::{Config, ThreadPoolInner};

// Benchmark 1: submission + barrier throughput
fn bench_submit_throughput(c: &mut Criterion) {
    let mut group = c.benchmark_group("submit_throughput");

    for size in [100, 1_000, 10_000] {
        group.throughput(Throughput::Elements(size as u64));

        group.bench_with_input(BenchmarkId::new("submit_wait", size), &size, |b, &size| {
            let pool = ThreadPoolInner::new(num_cpus::get()).unwrap();

            b.iter(|| {
                for i in 0..size {
                    pool.submit(move || {
                        black_box(i);
                    })
                    .unwrap();
                }
                pool.wait_until_finished();
            });

            pool.shutdown();
        });
    }

    group.finish();
}

// Benchmark 2: scoped batch overhead vs raw submission
fn bench_scoped_batches(c: &mut Criterion) {
    let mut group = c.benchmark_group("scoped_batches");

    for size in [100, 1_000] {
        group.throughput(Throughput::Elements(size as u64));

        group.bench_with_input(BenchmarkId::new("scoped", size), &size, |b, &size| {
            let pool = ThreadPoolInner::new(num_cpus::get()).unwrap();

            b.iter(|| {
                pool.scoped(|scope| {
                    for i in 0..size {
                        scope
                            .spawn(move || {
                                black_box(i);
                            })
                            .unwrap();
                    }
                });
            });

            pool.shutdown();
        });
    }

    group.finish();
}

// Benchmark 3: barrier latency when nothing is pending
fn bench_idle_barrier(c: &mut Criterion) {
    let pool = ThreadPoolInner::with_config(Config::single_threaded()).unwrap();

    c.bench_function("idle_wait_until_finished", |b| {
        b.iter(|| pool.wait_until_finished());
    });

    pool.shutdown();
}

criterion_group!(
    benches,
    bench_submit_throughput,
    bench_scoped_batches,
    bench_idle_barrier
);
criterion_main!(benches);
