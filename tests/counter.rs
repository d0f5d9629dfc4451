//! Tests for `AtomicCounter` and the integer helpers on `AtomicValue`.

use atomval::{AtomicCounter, AtomicValue, Counter};
use std::sync::Arc;
use std::thread;

#[test]
fn counter_basics() {
    let counter = AtomicCounter::new("hits", 5);
    assert_eq!(counter.name(), "hits");
    assert_eq!(counter.get(), 5);

    assert_eq!(counter.increment(1), 6);
    assert_eq!(counter.increment(10), 16);
    assert_eq!(counter.decrement(6), 10);
    assert_eq!(counter.set(-3), 10);
    assert_eq!(counter.get(), -3);
}

#[test]
fn counter_through_trait_object() {
    let counters: Vec<Box<dyn Counter + Send + Sync>> = vec![
        Box::new(AtomicCounter::new("a", 0)),
        Box::new(AtomicCounter::new("b", 100)),
    ];
    for counter in &counters {
        counter.increment(1);
    }
    let values: Vec<_> = counters.iter().map(|c| (c.name().to_string(), c.get())).collect();
    assert_eq!(values, vec![("a".to_string(), 1), ("b".to_string(), 101)]);
}

#[test]
fn counter_debug_includes_name() {
    let counter = AtomicCounter::new("requests", 7);
    let debug = format!("{counter:?}");
    assert!(debug.contains("requests"));
    assert!(debug.contains('7'));
}

#[test]
fn integer_helpers_wrap() {
    let cell = AtomicValue::new(Arc::new(u8::MAX));
    assert_eq!(*cell.increment(), 0);
    assert_eq!(*cell.decrement(), u8::MAX);
    assert_eq!(*cell.increment_by(10), 9);
    assert_eq!(*cell.decrement_by(10), u8::MAX);
}

#[test]
#[cfg_attr(miri, ignore)]
fn concurrent_counter_increments() {
    const THREADS: i64 = 16;
    const PER_THREAD: i64 = 2_000;

    let counter = Arc::new(AtomicCounter::new("concurrent", 0));

    let handles: Vec<_> = (0..THREADS)
        .map(|tid| {
            let counter = counter.clone();
            thread::spawn(move || {
                for _ in 0..PER_THREAD {
                    if tid % 2 == 0 {
                        counter.increment(3);
                    } else {
                        counter.decrement(1);
                    }
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    let evens = (THREADS + 1) / 2;
    let odds = THREADS / 2;
    assert_eq!(counter.get(), evens * PER_THREAD * 3 - odds * PER_THREAD);
}
