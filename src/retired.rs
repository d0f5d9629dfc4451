//! Retired slot references awaiting release.
//!
//! A `RetiredNode` records one strong reference that has been displaced from
//! a slot but may still be mid-retain in a concurrent reader. Nodes form an
//! intrusive singly linked list headed in the cell's
//! [`Domain`](crate::guard::Domain).

use alloc::boxed::Box;
use core::ptr;

/// Type-erased release function for one retired reference.
pub(crate) type ReleaseFn = unsafe fn(*mut ());

pub(crate) struct RetiredNode {
    /// Next node in the domain's retired list
    pub(crate) next: *mut RetiredNode,

    /// The displaced reference, erased to `*mut ()`.
    pub(crate) ptr: *mut (),

    /// Releases `ptr` exactly once.
    pub(crate) release: ReleaseFn,
}

impl RetiredNode {
    /// Allocates a detached node for `ptr`.
    pub(crate) fn boxed(ptr: *mut (), release: ReleaseFn) -> *mut Self {
        Box::into_raw(Box::new(Self {
            next: ptr::null_mut(),
            ptr,
            release,
        }))
    }
}

// SAFETY: the node is only touched by the thread that owns the detached list
// it belongs to; publication happens through the domain's atomic head.
unsafe impl Send for RetiredNode {}
