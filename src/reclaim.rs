//! Retired-list plumbing: push, splice and release.
//!
//! The list head is a Treiber-style atomic pointer. Producers push single
//! nodes; a collector detaches the whole list with one swap and either
//! releases it or splices it back in one CAS loop.

use crate::cas::{self, AtomicPtr};
use crate::retired::RetiredNode;
use alloc::boxed::Box;
use core::sync::atomic::Ordering;

/// Push the chain `first..=last` onto `head`.
///
/// # Safety
///
/// - `first` through `last` must be a well-formed chain of nodes owned by the
///   caller, with `last` reachable from `first`
/// - no other thread may access the chain until it is published here
pub(crate) unsafe fn splice(
    head: &AtomicPtr<RetiredNode>,
    first: *mut RetiredNode,
    last: *mut RetiredNode,
) {
    let mut current = head.load(Ordering::Relaxed);
    loop {
        unsafe {
            (*last).next = current;
        }
        match head.compare_exchange_weak(current, first, cas::SUCCESS, Ordering::Relaxed) {
            Ok(_) => return,
            Err(actual) => current = actual,
        }
    }
}

/// Find the tail of a detached list.
///
/// # Safety
///
/// `list` must be non-null and exclusively owned by the caller.
pub(crate) unsafe fn last_of(list: *mut RetiredNode) -> *mut RetiredNode {
    let mut curr = list;
    loop {
        let next = unsafe { (*curr).next };
        if next.is_null() {
            return curr;
        }
        curr = next;
    }
}

/// Release every reference in a detached list and free its nodes.
///
/// Returns the number of references released.
///
/// # Safety
///
/// - `list` must be null or exclusively owned by the caller
/// - no reader may still be between loading any of these references and
///   retaining it
pub(crate) unsafe fn release_list(mut list: *mut RetiredNode) -> usize {
    let mut released = 0;
    while !list.is_null() {
        // Take the node back first: a release may run arbitrary drop code.
        let node = unsafe { Box::from_raw(list) };
        list = node.next;
        unsafe {
            (node.release)(node.ptr);
        }
        released += 1;
    }
    released
}
