//! atomval: a single-slot atomic reference cell.
//!
//! [`AtomicValue<V>`] holds exactly one reference-counted value and lets any
//! number of threads read it, replace it, or replace it conditionally with a
//! hardware compare-and-swap. No locks are taken.
//!
//! # Key Features
//!
//! - **Identity CAS**: `compare_and_set` compares by pointer, one CAS instruction
//! - **Exact reference counting**: retain before publish, release after displace
//! - **Safe reads without a global lock**: displaced references are released
//!   only once no concurrent reader can still be retaining them
//! - **Build-time backend selection**: native atomics or `portable-atomic`;
//!   targets without pointer-width CAS fail to compile
//! - **Collector hooks**: [`Trace`] exposes the held reference to a host
//!   cycle collector
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use std::thread;
//! use atomval::AtomicValue;
//!
//! let cell = Arc::new(AtomicValue::new(Arc::new(0u64)));
//!
//! let handles: Vec<_> = (0..4)
//!     .map(|_| {
//!         let cell = cell.clone();
//!         thread::spawn(move || {
//!             for _ in 0..100 {
//!                 loop {
//!                     let current = cell.get();
//!                     if cell.compare_and_set(&current, &Arc::new(*current + 1)) {
//!                         break;
//!                     }
//!                 }
//!             }
//!         })
//!     })
//!     .collect();
//!
//! for handle in handles {
//!     handle.join().unwrap();
//! }
//! assert_eq!(*cell.get(), 400);
//! ```

#![warn(missing_docs)]

extern crate alloc;

mod atomic;
mod cas;
mod counter;
mod error;
mod guard;
mod integer;
mod managed;
mod reclaim;
mod retired;
mod trace;
mod value;

pub use cas::BACKEND;
pub use counter::{AtomicCounter, Counter};
pub use error::{Error, Result};
pub use integer::Integer;
pub use managed::Managed;
pub use trace::Trace;
pub use value::AtomicValue;
