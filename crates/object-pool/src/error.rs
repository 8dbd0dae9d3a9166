use thiserror::Error;

/// Errors that can occur when borrowing from a [`crate::Pool`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PoolError {
    /// The pool has been closed; no further borrows are possible.
    #[error("pool is closed")]
    Closed,
    /// `try_borrow` found no available permit without blocking.
    #[error("no resource available without blocking")]
    WouldBlock,
}
