//! Named counters.

use crate::value::AtomicValue;
use alloc::string::String;
use alloc::sync::Arc;

/// A named integer counter.
pub trait Counter {
    /// Name the counter was registered under.
    fn name(&self) -> &str;

    /// Current value.
    fn get(&self) -> i64;

    /// Replaces the value, returning the previous one.
    fn set(&self, value: i64) -> i64;

    /// Adds `n`, returning the new value.
    fn increment(&self, n: i64) -> i64;

    /// Subtracts `n`, returning the new value.
    fn decrement(&self, n: i64) -> i64;
}

/// A [`Counter`] safe to share between threads, built on [`AtomicValue`].
///
/// # Examples
///
/// ```rust
/// use atomval::{AtomicCounter, Counter};
///
/// let requests = AtomicCounter::new("requests", 0);
/// requests.increment(1);
/// requests.increment(2);
/// assert_eq!(requests.get(), 3);
/// assert_eq!(requests.set(0), 3);
/// ```
#[derive(Debug)]
pub struct AtomicCounter {
    name: String,
    value: AtomicValue<Arc<i64>>,
}

impl AtomicCounter {
    /// Creates a counter starting at `value`.
    pub fn new(name: impl Into<String>, value: i64) -> Self {
        Self {
            name: name.into(),
            value: AtomicValue::new(Arc::new(value)),
        }
    }
}

impl Counter for AtomicCounter {
    fn name(&self) -> &str {
        &self.name
    }

    fn get(&self) -> i64 {
        *self.value.get()
    }

    fn set(&self, value: i64) -> i64 {
        *self.value.set(Arc::new(value))
    }

    fn increment(&self, n: i64) -> i64 {
        *self.value.increment_by(n)
    }

    fn decrement(&self, n: i64) -> i64 {
        *self.value.decrement_by(n)
    }
}
