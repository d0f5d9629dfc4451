//! Reader guards and epoch-based deferred release for a single slot.
//!
//! Every cell owns a [`Domain`]: a generation counter (`epoch`), two reader
//! counters indexed by epoch parity, and three bags of displaced slot
//! references indexed by `epoch % 3`.
//!
//! Protocol (all operations on the epoch, the counters, the slot and the bag
//! heads are `SeqCst`, so they share one total order):
//!
//! - Reader: `pin` reads the epoch and registers in the counter of its
//!   parity, loads the slot, retains, and unregisters on guard drop. That is
//!   a fixed number of atomic steps; a reader never releases anything.
//! - Writer: exchange the slot, read the epoch, push the displaced reference
//!   into that epoch's bag, then [`Domain::collect`].
//! - Advance `e -> e + 1`: allowed once the counter of the previous parity is
//!   observed at zero while the epoch is still `e`. New readers register
//!   under the current parity, so the previous one drains even while reads
//!   keep overlapping. The advance frees the bag of epoch `e - 2`.
//!
//! A reference retired in epoch `y` is freed on the advance into `y + 3`.
//! The advances into `y + 2` and `y + 3` observed each reader counter at zero
//! after the reference left the slot, so every reader that could have loaded
//! it has unregistered. At most three epochs of displaced references are
//! queued while readers keep making progress.

use crate::cas::{AtomicPtr, AtomicUsize};
use crate::reclaim;
use crate::retired::{ReleaseFn, RetiredNode};
use core::ptr;
use core::sync::atomic::Ordering;
use tracing::trace;

/// Epochs wrap at a multiple of both the counter and the bag count.
const EPOCH_PERIOD: usize = usize::MAX / 6 * 6;

/// Advances needed to move every bag past its grace period.
const BAGS: usize = 3;

#[inline]
fn next_epoch(epoch: usize) -> usize {
    (epoch + 1) % EPOCH_PERIOD
}

pub(crate) struct Domain {
    /// Current generation.
    epoch: AtomicUsize,
    /// Registered readers, by epoch parity.
    readers: [AtomicUsize; 2],
    /// Displaced references, by the epoch they were retired in.
    retired: [AtomicPtr<RetiredNode>; BAGS],
}

impl Domain {
    pub(crate) const fn new() -> Self {
        Self {
            epoch: AtomicUsize::new(0),
            readers: [AtomicUsize::new(0), AtomicUsize::new(0)],
            retired: [
                AtomicPtr::new(ptr::null_mut()),
                AtomicPtr::new(ptr::null_mut()),
                AtomicPtr::new(ptr::null_mut()),
            ],
        }
    }

    /// Register a reader. Pointers loaded from the owning slot stay
    /// retainable until the guard drops.
    #[inline]
    pub(crate) fn pin(&self) -> Guard<'_> {
        let parity = self.epoch.load(Ordering::SeqCst) & 1;
        self.readers[parity].fetch_add(1, Ordering::SeqCst);
        Guard {
            domain: self,
            parity,
        }
    }

    /// Schedule `release(ptr)` for when no reader can still be retaining
    /// through it.
    ///
    /// # Safety
    ///
    /// - `ptr` must already be unreachable from the owning slot
    /// - `release(ptr)` must be sound to call exactly once, from any thread
    pub(crate) unsafe fn retire(&self, ptr: *mut (), release: ReleaseFn) {
        let node = RetiredNode::boxed(ptr, release);
        let epoch = self.epoch.load(Ordering::SeqCst);
        unsafe { reclaim::splice(&self.retired[epoch % BAGS], node, node) };
        self.collect();
    }

    /// Advance the epoch as far as readers allow, up to one full rotation,
    /// releasing every bag whose grace period has passed.
    ///
    /// Never waits: a reader still registered under the previous parity
    /// stops the rotation and the next writer picks it up.
    pub(crate) fn collect(&self) {
        for _ in 0..BAGS {
            if !self.try_advance() {
                trace!("readers active, release deferred");
                return;
            }
        }
    }

    fn try_advance(&self) -> bool {
        let epoch = self.epoch.load(Ordering::SeqCst);
        if self.readers[(epoch + 1) & 1].load(Ordering::SeqCst) != 0 {
            return false;
        }

        // The bag of `epoch - 2`, which becomes the bag of `epoch + 1`.
        // Detached before the epoch moves so nothing retired in `epoch + 1`
        // can end up in it.
        let bag = &self.retired[(epoch + 1) % BAGS];
        let list = bag.swap(ptr::null_mut(), Ordering::SeqCst);

        let next = next_epoch(epoch);
        if self
            .epoch
            .compare_exchange(epoch, next, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            if !list.is_null() {
                // SAFETY: detached above by this thread and non-null.
                unsafe {
                    let last = reclaim::last_of(list);
                    reclaim::splice(bag, list, last);
                }
            }
            return false;
        }

        if !list.is_null() {
            // SAFETY: every reference in the list was retired in an epoch at
            // least three behind `next`, and both reader counters have been
            // observed empty since.
            let released = unsafe { reclaim::release_list(list) };
            trace!(released, epoch = next, "released displaced references");
        }
        true
    }

    /// Release everything still queued. `&mut self` rules out readers.
    pub(crate) fn release_all(&mut self) -> usize {
        self.retired
            .iter_mut()
            .map(|bag| {
                let list = core::mem::replace(bag.get_mut(), ptr::null_mut());
                // SAFETY: exclusive access, so no reader can be mid-retain.
                unsafe { reclaim::release_list(list) }
            })
            .sum()
    }

    #[cfg(test)]
    pub(crate) fn pending(&self) -> usize {
        let mut count = 0;
        for bag in &self.retired {
            let mut curr = bag.load(Ordering::SeqCst);
            while !curr.is_null() {
                count += 1;
                curr = unsafe { (*curr).next };
            }
        }
        count
    }
}

impl Drop for Domain {
    fn drop(&mut self) {
        self.release_all();
    }
}

/// RAII registration of one reader in a [`Domain`].
pub(crate) struct Guard<'d> {
    domain: &'d Domain,
    parity: usize,
}

impl Drop for Guard<'_> {
    #[inline]
    fn drop(&mut self) {
        self.domain.readers[self.parity].fetch_sub(1, Ordering::SeqCst);
    }
}
