//! Shares an `AtomicCounter` and an `AtomicValue` configuration snapshot
//! between worker threads.
//!
//! Run with `cargo run --example counter`.

use atomval::{AtomicCounter, AtomicValue, Counter};
use std::sync::Arc;
use std::thread;

#[derive(Debug)]
struct Limits {
    max_batch: usize,
    generation: u32,
}

fn main() {
    let processed = Arc::new(AtomicCounter::new("processed", 0));
    let limits = Arc::new(AtomicValue::new(Arc::new(Limits {
        max_batch: 8,
        generation: 0,
    })));

    let workers: Vec<_> = (0..4)
        .map(|_| {
            let processed = processed.clone();
            let limits = limits.clone();
            thread::spawn(move || {
                for _ in 0..1_000 {
                    let current = limits.get();
                    processed.increment(current.max_batch as i64);
                }
            })
        })
        .collect();

    // Publish a new snapshot while the workers run.
    let installed = limits.update(|old| {
        Arc::new(Limits {
            max_batch: old.max_batch * 2,
            generation: old.generation + 1,
        })
    });
    println!("published limits generation {}", installed.generation);

    for worker in workers {
        worker.join().unwrap();
    }

    println!("{}: {}", processed.name(), processed.get());
    println!("final limits: {:?}", limits.get());
}
