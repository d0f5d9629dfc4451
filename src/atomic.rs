//! Typed atomic slot over the CAS backend.
//!
//! `Atomic<T>` holds a raw `*mut T` and exposes the handful of operations the
//! cell needs. Loads hand out a [`Shared`] tied to a reader [`Guard`], so a
//! loaded pointer cannot be carried past the point where its reference might
//! be released.

use crate::cas::{self, AtomicPtr};
use crate::guard::Guard;
use core::marker::PhantomData;
use core::ptr;
use core::sync::atomic::Ordering;

/// A pointer-width slot with atomic load, swap and compare-and-set.
pub(crate) struct Atomic<T> {
    data: AtomicPtr<T>,
}

impl<T> Atomic<T> {
    #[inline]
    pub(crate) fn new(ptr: *mut T) -> Self {
        Self {
            data: AtomicPtr::new(ptr),
        }
    }

    /// Loads the current pointer under a reader guard.
    ///
    /// `SeqCst` so the load is ordered after the guard's registration.
    #[inline]
    pub(crate) fn load<'g>(&self, _guard: &'g Guard<'_>) -> Shared<'g, T> {
        Shared {
            data: self.data.load(Ordering::SeqCst),
            _marker: PhantomData,
        }
    }

    /// Loads the current pointer for identity comparison only.
    ///
    /// The result must not be dereferenced: nothing keeps it alive.
    #[inline]
    pub(crate) fn load_unprotected(&self) -> *mut T {
        self.data.load(Ordering::Acquire)
    }

    /// Unconditionally installs `new`, returning the displaced pointer.
    ///
    /// Ownership of whatever reference the slot held moves to the caller.
    #[inline]
    pub(crate) fn swap(&self, new: *mut T) -> *mut T {
        self.data.swap(new, cas::SUCCESS)
    }

    /// Installs `new` if the slot still holds `expected`.
    #[inline]
    pub(crate) fn compare_and_set(&self, expected: *mut T, new: *mut T) -> bool {
        cas::compare_exchange(&self.data, expected, new)
    }

    /// Empties the slot. `&mut self` rules out concurrent readers.
    #[inline]
    pub(crate) fn take(&mut self) -> *mut T {
        core::mem::replace(self.data.get_mut(), ptr::null_mut())
    }
}

/// A pointer loaded from an [`Atomic`], valid for the guard lifetime `'g`.
pub(crate) struct Shared<'g, T> {
    data: *mut T,
    _marker: PhantomData<(&'g (), *mut T)>,
}

impl<T> Shared<'_, T> {
    #[inline]
    pub(crate) fn as_raw(&self) -> *mut T {
        self.data
    }

    #[inline]
    pub(crate) fn is_null(&self) -> bool {
        self.data.is_null()
    }
}

impl<T> Clone for Shared<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Shared<'_, T> {}

impl<T> PartialEq for Shared<'_, T> {
    fn eq(&self, other: &Self) -> bool {
        self.data == other.data
    }
}

impl<T> Eq for Shared<'_, T> {}

impl<T> core::fmt::Debug for Shared<'_, T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "Shared({:p})", self.data)
    }
}
