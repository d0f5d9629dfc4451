//! A single-slot atomic reference cell.
//!
//! The cell owns one strong reference to a [`Managed`] value (an `Arc<T>`, or
//! a host handle type). Readers get their own strong reference back; writers
//! exchange the slot with a plain atomic swap (`set`) or a hardware
//! compare-and-swap (`compare_and_set`). Values are compared by identity.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use atomval::AtomicValue;
//!
//! let a = Arc::new("A");
//! let cell = AtomicValue::new(a.clone());
//!
//! let b = Arc::new("B");
//! assert!(cell.compare_and_set(&a, &b));
//! assert_eq!(*cell.get(), "B");
//!
//! // `a` is no longer in the slot
//! assert!(!cell.compare_and_set(&a, &Arc::new("C")));
//!
//! let previous = cell.set(Arc::new("D"));
//! assert_eq!(*previous, "B");
//! assert_eq!(*cell.get(), "D");
//! ```

use crate::atomic::Atomic;
use crate::error::{Error, Result};
use crate::guard::Domain;
use crate::managed::{self, Managed};
use crate::trace::Trace;
use core::fmt;
use core::marker::PhantomData;
use core::mem::ManuallyDrop;
use core::ops::ControlFlow;
use crossbeam_utils::Backoff;
use tracing::{debug, trace};

/// A thread-safe cell holding exactly one reference-counted value.
///
/// All operations are non-blocking. [`get`](AtomicValue::get) and
/// [`set`](AtomicValue::set) take a bounded number of atomic steps;
/// [`compare_and_set`](AtomicValue::compare_and_set) is a single CAS and
/// reports a lost race as `false`.
///
/// References displaced by `set` or a successful `compare_and_set` are
/// released once no concurrent `get` can still be retaining them.
///
/// # Examples
///
/// ```rust
/// use std::sync::Arc;
/// use atomval::AtomicValue;
///
/// let cell = AtomicValue::new(Arc::new(1));
/// let old = cell.set(Arc::new(2));
/// assert_eq!(*old, 1);
/// assert_eq!(*cell.get(), 2);
/// ```
pub struct AtomicValue<V: Managed> {
    slot: Atomic<V::Target>,
    domain: Domain,
    _marker: PhantomData<V>,
}

impl<V: Managed> AtomicValue<V> {
    // ---- Construction ----

    /// Creates a cell holding `initial`.
    ///
    /// The cell takes over the reference `initial` owns.
    #[inline]
    pub fn new(initial: V) -> Self {
        Self {
            slot: Atomic::new(V::into_raw(initial).cast_mut()),
            domain: Domain::new(),
            _marker: PhantomData,
        }
    }

    /// Consumes the cell and returns the held value without touching its
    /// reference count.
    ///
    /// # Panics
    ///
    /// Panics if the cell has been [cleared](Trace::clear).
    pub fn into_inner(mut self) -> V {
        let ptr = self.slot.take();
        // Drop releases pending retired references; the slot is empty now.
        drop(self);
        if ptr.is_null() {
            panic!("{}", Error::Cleared);
        }
        // SAFETY: the slot owned this reference and nobody else can claim it.
        unsafe { V::from_raw(ptr) }
    }

    // ---- Reading ----

    /// Returns a strong reference to the current value.
    ///
    /// # Panics
    ///
    /// Panics if the cell has been [cleared](Trace::clear).
    #[inline]
    pub fn get(&self) -> V {
        match self.try_get() {
            Ok(value) => value,
            Err(err) => panic!("{err}"),
        }
    }

    /// Returns a strong reference to the current value, or
    /// [`Error::Cleared`] if the collector emptied the slot.
    #[inline]
    pub fn try_get(&self) -> Result<V> {
        let guard = self.domain.pin();
        let current = self.slot.load(&guard);
        if current.is_null() {
            return Err(Error::Cleared);
        }
        let ptr = current.as_raw().cast_const();
        // SAFETY: while `guard` is alive the slot's reference to `ptr` cannot
        // be released, so the value is live for the retain.
        unsafe {
            V::retain(ptr);
            Ok(V::from_raw(ptr))
        }
    }

    /// The current value, for introspection. Same contract as
    /// [`get`](AtomicValue::get).
    #[inline]
    pub fn value(&self) -> V {
        self.get()
    }

    /// Returns `true` if the collector has emptied the slot.
    #[inline]
    pub fn is_cleared(&self) -> bool {
        self.slot.load_unprotected().is_null()
    }

    // ---- Writing ----

    /// Unconditionally replaces the held value, returning the previous one.
    ///
    /// The slot takes over the reference `new` owns. The previous value is
    /// retained once for the caller before the slot's own reference to it is
    /// queued for release.
    ///
    /// Racing `set`s are ordered by the underlying atomic exchange; use
    /// [`compare_and_set`](AtomicValue::compare_and_set) to make an update
    /// conditional on what was observed.
    ///
    /// # Panics
    ///
    /// Panics if the cell has been [cleared](Trace::clear). The cell stays
    /// cleared and `new` is dropped.
    pub fn set(&self, new: V) -> V {
        match self.try_set(new) {
            Ok(previous) => previous,
            Err(err) => panic!("{err}"),
        }
    }

    /// Replaces the held value, or returns [`Error::Cleared`] without
    /// touching the slot if the collector emptied it.
    pub fn try_set(&self, new: V) -> Result<V> {
        // Only `clear` empties the slot and it needs `&mut self`, so the slot
        // cannot become empty between this check and the swap.
        if self.is_cleared() {
            return Err(Error::Cleared);
        }
        let new_ptr = V::into_raw(new).cast_mut();
        let old_ptr = self.slot.swap(new_ptr);
        // SAFETY: the slot's reference to `old_ptr` is now ours and is only
        // released through the domain, after the extra retain below.
        unsafe {
            V::retain(old_ptr);
            self.domain.retire(old_ptr.cast(), managed::release_erased::<V>);
            Ok(V::from_raw(old_ptr))
        }
    }

    /// Replaces the held value with `new` if it is currently `expected`.
    ///
    /// Identity is pointer identity ([`Managed::as_ptr`]). On success the
    /// slot holds its own reference to `new` and the displaced reference to
    /// `expected` is queued for release. On failure nothing changes, the
    /// reference counts included.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use std::sync::Arc;
    /// use atomval::AtomicValue;
    ///
    /// let zero = Arc::new(0);
    /// let cell = AtomicValue::new(zero.clone());
    /// assert!(cell.compare_and_set(&zero, &Arc::new(1)));
    /// // An equal but distinct value does not match.
    /// assert!(!cell.compare_and_set(&Arc::new(1), &Arc::new(2)));
    /// ```
    pub fn compare_and_set(&self, expected: &V, new: &V) -> bool {
        let expected_ptr = V::as_ptr(expected).cast_mut();
        let new_ptr = V::as_ptr(new).cast_mut();

        if self.slot.load_unprotected() != expected_ptr {
            return false;
        }

        // SAFETY: the caller's `new` keeps the value alive. This reference is
        // the one the slot will own.
        unsafe { V::retain(new_ptr) };

        if self.slot.compare_and_set(expected_ptr, new_ptr) {
            // SAFETY: the slot's reference to `expected_ptr` is unreachable
            // from the slot now and is released exactly once.
            unsafe { self.domain.retire(expected_ptr.cast(), managed::release_erased::<V>) };
            true
        } else {
            // SAFETY: undo the speculative retain; the caller still holds `new`.
            unsafe { V::release(new_ptr) };
            false
        }
    }

    /// Atomically replaces the value with `f(current)`, retrying on
    /// contention. Returns the value installed.
    ///
    /// `f` may run several times; keep it cheap.
    ///
    /// # Panics
    ///
    /// Panics if the cell has been [cleared](Trace::clear).
    ///
    /// # Examples
    ///
    /// ```rust
    /// use std::sync::Arc;
    /// use atomval::AtomicValue;
    ///
    /// let cell = AtomicValue::new(Arc::new(vec![1]));
    /// cell.update(|v| {
    ///     let mut next = (**v).clone();
    ///     next.push(2);
    ///     Arc::new(next)
    /// });
    /// assert_eq!(*cell.get(), vec![1, 2]);
    /// ```
    pub fn update<F>(&self, mut f: F) -> V
    where
        F: FnMut(&V) -> V,
    {
        let backoff = Backoff::new();
        loop {
            let current = self.get();
            let next = f(&current);
            if self.compare_and_set(&current, &next) {
                return next;
            }
            trace!("update lost compare-and-set race, retrying");
            backoff.spin();
        }
    }

    /// Makes one attempt to replace the value with `f(current)`.
    ///
    /// Returns [`Error::Contended`] if another thread changed the value
    /// between the read and the compare-and-set.
    pub fn try_update<F>(&self, f: F) -> Result<V>
    where
        F: FnOnce(&V) -> V,
    {
        let current = self.try_get()?;
        let next = f(&current);
        if self.compare_and_set(&current, &next) {
            Ok(next)
        } else {
            Err(Error::Contended)
        }
    }

    /// Releases displaced references whose release was deferred behind
    /// readers, as far as the readers registered right now allow. Never
    /// waits.
    #[inline]
    pub fn flush(&self) {
        self.domain.collect();
    }
}

impl<V: Managed> Trace for AtomicValue<V> {
    type Item = V;

    fn trace(&self, visit: &mut dyn FnMut(&V) -> ControlFlow<()>) -> ControlFlow<()> {
        let guard = self.domain.pin();
        let current = self.slot.load(&guard);
        if current.is_null() {
            return ControlFlow::Continue(());
        }
        // SAFETY: the guard keeps the slot's reference alive; ManuallyDrop
        // stops the borrowed handle from releasing a reference it never owned.
        let borrowed = ManuallyDrop::new(unsafe { V::from_raw(current.as_raw().cast_const()) });
        visit(&*borrowed)
    }

    fn clear(&mut self) {
        let ptr = self.slot.take();
        if !ptr.is_null() {
            // SAFETY: the slot owned this reference; `&mut self` excludes readers.
            unsafe { V::release(ptr) };
        }
        let released = self.domain.release_all();
        debug!(released, "atomic value cleared");
    }
}

impl<V: Managed> Drop for AtomicValue<V> {
    fn drop(&mut self) {
        let ptr = self.slot.take();
        if !ptr.is_null() {
            // SAFETY: exclusive access, the slot owned this reference.
            unsafe { V::release(ptr) };
        }
        // `domain` releases whatever is still retired when it drops.
    }
}

impl<V: Managed + Default> Default for AtomicValue<V> {
    fn default() -> Self {
        Self::new(V::default())
    }
}

impl<V: Managed> From<V> for AtomicValue<V> {
    fn from(value: V) -> Self {
        Self::new(value)
    }
}

impl<V: Managed + fmt::Debug> fmt::Debug for AtomicValue<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.try_get() {
            Ok(value) => f.debug_struct("AtomicValue").field("value", &value).finish(),
            Err(_) => f.write_str("AtomicValue(<cleared>)"),
        }
    }
}

// SAFETY: the slot is only mutated atomically and `Managed` requires
// thread-safe retain/release; handing `V`s across threads needs `V: Send`,
// sharing them needs `V: Sync`.
unsafe impl<V: Managed + Send + Sync> Send for AtomicValue<V> {}
unsafe impl<V: Managed + Send + Sync> Sync for AtomicValue<V> {}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::sync::Arc;

    #[test]
    fn displaced_reference_waits_for_reader() {
        let a = Arc::new(1);
        let cell = AtomicValue::new(a.clone());
        assert_eq!(Arc::strong_count(&a), 2);

        let guard = cell.domain.pin();
        let old = cell.set(Arc::new(2));
        // test handle, returned handle, and the slot's queued reference
        assert_eq!(Arc::strong_count(&a), 3);
        assert_eq!(cell.domain.pending(), 1);

        drop(guard);
        // Unpinning does no release work; the next writer or a flush does.
        assert_eq!(Arc::strong_count(&a), 3);
        cell.flush();
        assert_eq!(Arc::strong_count(&a), 2);
        drop(old);
        assert_eq!(Arc::strong_count(&a), 1);
    }

    #[test]
    fn overlapping_reads_keep_backlog_bounded() {
        let first = Arc::new(0usize);
        let first_weak = Arc::downgrade(&first);
        let cell = AtomicValue::new(first);

        // A reader is registered at every instant of the loop.
        let mut held = cell.domain.pin();
        let mut displaced = Vec::new();
        for i in 1..=1_000 {
            let next = cell.domain.pin();
            drop(core::mem::replace(&mut held, next));
            displaced.push(Arc::downgrade(&cell.set(Arc::new(i))));
            assert!(cell.domain.pending() <= 3, "backlog {}", cell.domain.pending());
        }

        assert!(first_weak.upgrade().is_none());
        let alive = displaced.iter().filter(|w| w.upgrade().is_some()).count();
        assert!(alive <= 3, "{alive} displaced values still alive");
        drop(held);
    }

    #[test]
    fn failed_cas_skips_retain() {
        let a = Arc::new(1);
        let b = Arc::new(2);
        let cell = AtomicValue::new(a.clone());

        assert!(!cell.compare_and_set(&b, &b));
        assert_eq!(Arc::strong_count(&b), 1);
        assert_eq!(Arc::strong_count(&a), 2);
    }

    #[test]
    fn clear_then_into_inner_panics() {
        let mut cell = AtomicValue::new(Arc::new(5));
        cell.clear();
        assert!(cell.is_cleared());
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| cell.into_inner()));
        assert!(result.is_err());
    }
}
