//! Pointer-width compare-and-swap backend.
//!
//! Exactly one backend is compiled in, chosen by `cfg` at build time:
//!
//! - `portable-atomic` feature: [`portable_atomic::AtomicPtr`] and friends,
//!   which carry their own inline-asm CAS for targets where the native
//!   intrinsics are missing or weak.
//! - default: `core::sync::atomic`, which only exists on targets with
//!   pointer-width CAS (`target_has_atomic = "ptr"`).
//!
//! A target with neither is rejected by `compile_error!`. There is no lock
//! based fallback.

use core::sync::atomic::Ordering;

#[cfg(feature = "portable-atomic")]
pub(crate) use portable_atomic::{AtomicPtr, AtomicUsize};

#[cfg(all(not(feature = "portable-atomic"), target_has_atomic = "ptr"))]
pub(crate) use core::sync::atomic::{AtomicPtr, AtomicUsize};

#[cfg(all(not(feature = "portable-atomic"), not(target_has_atomic = "ptr")))]
compile_error!(
    "atomval: this target has no pointer-width compare-and-swap; \
     enable the `portable-atomic` feature or build for a target that has one"
);

/// Name of the compiled-in CAS backend.
#[cfg(feature = "portable-atomic")]
pub const BACKEND: &str = "portable-atomic";

/// Name of the compiled-in CAS backend.
#[cfg(not(feature = "portable-atomic"))]
pub const BACKEND: &str = "native";

/// Ordering of every successful exchange on a slot.
///
/// `SeqCst` rather than `AcqRel`: [`Domain`](crate::guard::Domain) relies on
/// a single total order between slot exchanges, epoch reads and advances,
/// and reader registration.
pub(crate) const SUCCESS: Ordering = Ordering::SeqCst;

/// Ordering of the load performed by a failed exchange.
pub(crate) const FAILURE: Ordering = Ordering::Acquire;

/// Atomically replace `*slot` with `new` if it currently equals `expected`.
///
/// Returns `true` when the exchange happened. A `false` return means the
/// slot held something else and was left untouched.
#[inline]
pub(crate) fn compare_exchange<T>(slot: &AtomicPtr<T>, expected: *mut T, new: *mut T) -> bool {
    slot.compare_exchange(expected, new, SUCCESS, FAILURE).is_ok()
}
