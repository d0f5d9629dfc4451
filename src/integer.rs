//! Arithmetic updates for cells holding shared integers.

use crate::value::AtomicValue;
use alloc::sync::Arc;

/// Primitive integers usable with [`AtomicValue::increment`] and friends.
///
/// Arithmetic wraps on overflow, like the `fetch_add` family of the standard
/// atomic integers.
pub trait Integer: Copy + Send + Sync + 'static {
    /// The value `1`.
    const ONE: Self;

    /// `self + rhs`, wrapping.
    fn wrapping_add(self, rhs: Self) -> Self;

    /// `self - rhs`, wrapping.
    fn wrapping_sub(self, rhs: Self) -> Self;
}

macro_rules! impl_integer {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Integer for $ty {
                const ONE: Self = 1;

                #[inline]
                fn wrapping_add(self, rhs: Self) -> Self {
                    <$ty>::wrapping_add(self, rhs)
                }

                #[inline]
                fn wrapping_sub(self, rhs: Self) -> Self {
                    <$ty>::wrapping_sub(self, rhs)
                }
            }
        )*
    };
}

impl_integer!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);

impl<N: Integer> AtomicValue<Arc<N>> {
    /// Atomically adds one, returning the new value.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use std::sync::Arc;
    /// use atomval::AtomicValue;
    ///
    /// let hits = AtomicValue::new(Arc::new(0u64));
    /// assert_eq!(*hits.increment(), 1);
    /// ```
    #[inline]
    pub fn increment(&self) -> Arc<N> {
        self.increment_by(N::ONE)
    }

    /// Atomically subtracts one, returning the new value.
    #[inline]
    pub fn decrement(&self) -> Arc<N> {
        self.decrement_by(N::ONE)
    }

    /// Atomically adds `n`, returning the new value.
    pub fn increment_by(&self, n: N) -> Arc<N> {
        self.update(|current| Arc::new(current.wrapping_add(n)))
    }

    /// Atomically subtracts `n`, returning the new value.
    pub fn decrement_by(&self, n: N) -> Arc<N> {
        self.update(|current| Arc::new(current.wrapping_sub(n)))
    }
}
