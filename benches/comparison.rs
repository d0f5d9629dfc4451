//! Comparison benchmarks: AtomicValue vs ArcSwap vs RwLock<Arc<T>>

use arc_swap::ArcSwap;
use atomval::AtomicValue;
use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use parking_lot::RwLock;
use std::sync::Arc;
use std::thread;

mod atomval_bench {
    use super::*;

    pub fn read_heavy(num_threads: usize, ops_per_thread: usize) {
        let cell = Arc::new(AtomicValue::new(Arc::new(0usize)));

        let handles: Vec<_> = (0..num_threads)
            .map(|tid| {
                let cell = cell.clone();
                thread::spawn(move || {
                    for i in 0..ops_per_thread {
                        if i % 10 == 0 {
                            black_box(cell.set(Arc::new(tid * ops_per_thread + i)));
                        } else {
                            black_box(*cell.get());
                        }
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }
    }

    pub fn cas_increment(num_threads: usize, ops_per_thread: usize) {
        let cell = Arc::new(AtomicValue::new(Arc::new(0usize)));

        let handles: Vec<_> = (0..num_threads)
            .map(|_| {
                let cell = cell.clone();
                thread::spawn(move || {
                    for _ in 0..ops_per_thread {
                        loop {
                            let current = cell.get();
                            if cell.compare_and_set(&current, &Arc::new(*current + 1)) {
                                break;
                            }
                        }
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }
    }
}

mod arc_swap_bench {
    use super::*;

    pub fn read_heavy(num_threads: usize, ops_per_thread: usize) {
        let cell = Arc::new(ArcSwap::from_pointee(0usize));

        let handles: Vec<_> = (0..num_threads)
            .map(|tid| {
                let cell = cell.clone();
                thread::spawn(move || {
                    for i in 0..ops_per_thread {
                        if i % 10 == 0 {
                            black_box(cell.swap(Arc::new(tid * ops_per_thread + i)));
                        } else {
                            black_box(**cell.load());
                        }
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }
    }

    pub fn cas_increment(num_threads: usize, ops_per_thread: usize) {
        let cell = Arc::new(ArcSwap::from_pointee(0usize));

        let handles: Vec<_> = (0..num_threads)
            .map(|_| {
                let cell = cell.clone();
                thread::spawn(move || {
                    for _ in 0..ops_per_thread {
                        cell.rcu(|current| Arc::new(**current + 1));
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }
    }
}

mod rwlock_bench {
    use super::*;

    pub fn read_heavy(num_threads: usize, ops_per_thread: usize) {
        let cell = Arc::new(RwLock::new(Arc::new(0usize)));

        let handles: Vec<_> = (0..num_threads)
            .map(|tid| {
                let cell = cell.clone();
                thread::spawn(move || {
                    for i in 0..ops_per_thread {
                        if i % 10 == 0 {
                            let next = Arc::new(tid * ops_per_thread + i);
                            black_box(std::mem::replace(&mut *cell.write(), next));
                        } else {
                            black_box(*cell.read().clone());
                        }
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }
    }

    pub fn cas_increment(num_threads: usize, ops_per_thread: usize) {
        let cell = Arc::new(RwLock::new(Arc::new(0usize)));

        let handles: Vec<_> = (0..num_threads)
            .map(|_| {
                let cell = cell.clone();
                thread::spawn(move || {
                    for _ in 0..ops_per_thread {
                        let mut slot = cell.write();
                        *slot = Arc::new(**slot + 1);
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }
    }
}

fn bench_single_thread(c: &mut Criterion) {
    let mut group = c.benchmark_group("single_thread");

    let cell = AtomicValue::new(Arc::new(1usize));
    let swap = ArcSwap::from_pointee(1usize);
    let lock = RwLock::new(Arc::new(1usize));

    group.bench_function("atomval_get", |b| b.iter(|| black_box(cell.get())));
    group.bench_function("arc_swap_load_full", |b| b.iter(|| black_box(swap.load_full())));
    group.bench_function("rwlock_read_clone", |b| b.iter(|| black_box(lock.read().clone())));

    let value = Arc::new(2usize);
    group.bench_function("atomval_set", |b| b.iter(|| black_box(cell.set(value.clone()))));
    group.bench_function("arc_swap_swap", |b| b.iter(|| black_box(swap.swap(value.clone()))));
    group.bench_function("rwlock_replace", |b| {
        b.iter(|| black_box(std::mem::replace(&mut *lock.write(), value.clone())))
    });

    let stale = Arc::new(3usize);
    group.bench_function("atomval_failed_cas", |b| {
        b.iter(|| black_box(cell.compare_and_set(&stale, &value)))
    });
    group.bench_function("arc_swap_failed_cas", |b| {
        b.iter(|| black_box(swap.compare_and_swap(&stale, value.clone())))
    });

    group.finish();
}

fn bench_read_heavy(c: &mut Criterion) {
    let mut group = c.benchmark_group("read_heavy");
    group.sample_size(20);

    for threads in [2, 4, 8].iter() {
        let ops_per_thread = 10_000;
        group.throughput(Throughput::Elements((threads * ops_per_thread) as u64));

        group.bench_with_input(BenchmarkId::new("atomval", threads), threads, |b, &t| {
            b.iter(|| atomval_bench::read_heavy(t, ops_per_thread))
        });
        group.bench_with_input(BenchmarkId::new("arc_swap", threads), threads, |b, &t| {
            b.iter(|| arc_swap_bench::read_heavy(t, ops_per_thread))
        });
        group.bench_with_input(BenchmarkId::new("rwlock", threads), threads, |b, &t| {
            b.iter(|| rwlock_bench::read_heavy(t, ops_per_thread))
        });
    }

    group.finish();
}

fn bench_cas_increment(c: &mut Criterion) {
    let mut group = c.benchmark_group("cas_increment");
    group.sample_size(20);

    for threads in [1, 2, 4, 8].iter() {
        let ops_per_thread = 5_000;
        group.throughput(Throughput::Elements((threads * ops_per_thread) as u64));

        group.bench_with_input(BenchmarkId::new("atomval", threads), threads, |b, &t| {
            b.iter(|| atomval_bench::cas_increment(t, ops_per_thread))
        });
        group.bench_with_input(BenchmarkId::new("arc_swap", threads), threads, |b, &t| {
            b.iter(|| arc_swap_bench::cas_increment(t, ops_per_thread))
        });
        group.bench_with_input(BenchmarkId::new("rwlock", threads), threads, |b, &t| {
            b.iter(|| rwlock_bench::cas_increment(t, ops_per_thread))
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_single_thread,
    bench_read_heavy,
    bench_cas_increment
);
criterion_main!(benches);
