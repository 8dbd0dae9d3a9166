//! Pool - A Bounded Object Pool
//!
//! A fixed-capacity pool of reusable resources, pre-warmed to a minimum
//! population and grown lazily up to a maximum. Resources are validated on
//! the way back in; a resource that fails validation is discarded instead of
//! being recycled, and the pool tops itself back up to its minimum on a
//! best-effort basis.
//!
//! # Example
//!
//! ```
//! use object_pool::Pool;
//!
//! let pool: Pool<Vec<u8>> = Pool::new(1, 2, Vec::new, |_| true);
//! let guard = pool.borrow().unwrap();
//! assert!(guard.is_empty());
//! drop(guard);
//! assert_eq!(pool.available_count(), 1);
//! ```

mod error;
mod invariants;
mod permits;
mod pool;

pub use error::PoolError;
pub use pool::{Guard, Pool};
