//! Debug assertion macros for lru-cache invariants.
//!
//! These are only active in debug builds (`#[cfg(debug_assertions)]`), so
//! there is zero overhead in release builds.

// =============================================================================
// INV-LC-01: Size never exceeds capacity
// =============================================================================

/// Assert that the live entry count never exceeds the configured capacity.
macro_rules! debug_assert_capacity_bound {
    ($len:expr, $capacity:expr) => {
        debug_assert!(
            $len <= $capacity,
            "INV-LC-01 violated: {} entries exceeds capacity {}",
            $len,
            $capacity
        )
    };
}

// =============================================================================
// INV-LC-02: head/tail agree with the empty/non-empty list state
// =============================================================================

/// Assert that `head` and `tail` are both `None` exactly when the list is
/// empty, and both `Some` otherwise.
macro_rules! debug_assert_list_consistent {
    ($head:expr, $tail:expr, $len:expr) => {
        debug_assert!(
            ($head.is_none() && $tail.is_none() && $len == 0)
                || ($head.is_some() && $tail.is_some() && $len > 0),
            "INV-LC-02 violated: head={:?} tail={:?} len={}",
            $head,
            $tail,
            $len
        )
    };
}

pub(crate) use debug_assert_capacity_bound;
pub(crate) use debug_assert_list_consistent;
