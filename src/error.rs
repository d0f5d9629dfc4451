use thiserror::Error;

/// Errors reported by [`AtomicValue`](crate::AtomicValue) operations.
///
/// A `compare_and_set` that loses its race is not an error; it returns
/// `false`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Error {
    /// A non-spinning update lost its compare-and-set race.
    #[error("atomic update failed: value changed concurrently")]
    Contended,
    /// The slot was emptied by a collector through [`Trace::clear`](crate::Trace::clear).
    #[error("atomic value has been cleared by the collector")]
    Cleared,
}

/// Result alias for this crate.
pub type Result<T> = core::result::Result<T, Error>;
