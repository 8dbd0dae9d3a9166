//! Debug assertion macros for object-pool invariants.
//!
//! These are only active in debug builds (`#[cfg(debug_assertions)]`), so
//! there is zero overhead in release builds.

// =============================================================================
// INV-OP-01: Permits never exceed max
// =============================================================================

/// Assert that the permit count never climbs above the pool's configured max.
macro_rules! debug_assert_permits_bounded {
    ($available:expr, $max:expr) => {
        debug_assert!(
            $available <= $max,
            "INV-OP-01 violated: {} available permits exceeds max {}",
            $available,
            $max
        )
    };
}

// =============================================================================
// INV-OP-02: Idle count never exceeds max
// =============================================================================

/// Assert that the idle queue never holds more resources than the pool's max.
macro_rules! debug_assert_idle_bounded {
    ($idle:expr, $max:expr) => {
        debug_assert!(
            $idle <= $max,
            "INV-OP-02 violated: {} idle resources exceeds max {}",
            $idle,
            $max
        )
    };
}

pub(crate) use debug_assert_idle_bounded;
pub(crate) use debug_assert_permits_bounded;
