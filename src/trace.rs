//! Hooks for a host cycle collector.

use core::ops::ControlFlow;

/// Exposes the references a container owns to a tracing collector.
///
/// `trace` lets the collector walk through the container without touching
/// reference counts. `clear` drops the owned references to break a cycle; it
/// takes `&mut self` because a collector only clears containers that are
/// otherwise unreachable.
pub trait Trace {
    /// The owned reference type.
    type Item;

    /// Calls `visit` with every owned reference, stopping early on
    /// [`ControlFlow::Break`].
    fn trace(&self, visit: &mut dyn FnMut(&Self::Item) -> ControlFlow<()>) -> ControlFlow<()>;

    /// Releases every owned reference, leaving the container empty.
    fn clear(&mut self);
}
