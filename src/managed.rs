//! Host ownership primitives.
//!
//! The cell never allocates or frees values itself. It only moves strong
//! references in and out of its slot and asks the value's handle type to
//! retain or release them.

use alloc::sync::Arc;

/// A strong, thread-safe handle to a reference-counted value.
///
/// A handle owns exactly one strong reference. [`into_raw`](Managed::into_raw)
/// converts that reference into a thin pointer and
/// [`from_raw`](Managed::from_raw) converts it back; `retain` and `release`
/// add or drop one reference through a pointer without materialising a
/// handle.
///
/// Two handles are the *same value* when [`as_ptr`](Managed::as_ptr) returns
/// the same address.
///
/// # Safety
///
/// Implementors must guarantee that:
/// - `into_raw` never returns null, and returns the same address as `as_ptr`
/// - `retain` and `release` are safe to call concurrently from any thread on
///   the same value
/// - a value stays allocated while at least one reference is outstanding
pub unsafe trait Managed: Sized {
    /// The pointee addressed by raw pointers.
    type Target;

    /// Gives up the handle, keeping its reference alive behind a raw pointer.
    fn into_raw(this: Self) -> *const Self::Target;

    /// Rebuilds a handle that owns one reference.
    ///
    /// # Safety
    ///
    /// `ptr` must come from [`into_raw`](Managed::into_raw) (directly or after
    /// a [`retain`](Managed::retain)) and the reference it stands for must not
    /// be claimed twice.
    unsafe fn from_raw(ptr: *const Self::Target) -> Self;

    /// Address identifying the referenced value.
    fn as_ptr(this: &Self) -> *const Self::Target;

    /// Adds one strong reference.
    ///
    /// # Safety
    ///
    /// `ptr` must address a live value.
    unsafe fn retain(ptr: *const Self::Target);

    /// Drops one strong reference, destroying the value if it was the last.
    ///
    /// # Safety
    ///
    /// The caller must own the reference being dropped.
    unsafe fn release(ptr: *const Self::Target);
}

unsafe impl<T> Managed for Arc<T> {
    type Target = T;

    #[inline]
    fn into_raw(this: Self) -> *const T {
        Arc::into_raw(this)
    }

    #[inline]
    unsafe fn from_raw(ptr: *const T) -> Self {
        unsafe { Arc::from_raw(ptr) }
    }

    #[inline]
    fn as_ptr(this: &Self) -> *const T {
        Arc::as_ptr(this)
    }

    #[inline]
    unsafe fn retain(ptr: *const T) {
        unsafe { Arc::increment_strong_count(ptr) }
    }

    #[inline]
    unsafe fn release(ptr: *const T) {
        unsafe { Arc::decrement_strong_count(ptr) }
    }
}

/// [`Managed::release`] with the pointer type erased, for the retired list.
///
/// # Safety
///
/// `ptr` must be a `*const V::Target` whose reference the caller owns.
pub(crate) unsafe fn release_erased<V: Managed>(ptr: *mut ()) {
    unsafe { V::release(ptr as *const V::Target) }
}
