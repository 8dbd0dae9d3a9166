//! Debug assertion macros for append-log invariants.
//!
//! These are only active in debug builds (`#[cfg(debug_assertions)]`), so
//! there is zero overhead in release builds.

// =============================================================================
// INV-AL-01: Monotonic cursor
// =============================================================================

/// Assert that the reservation cursor only increases.
macro_rules! debug_assert_monotonic_cursor {
    ($old:expr, $new:expr) => {
        debug_assert!(
            $new >= $old,
            "INV-AL-01 violated: cursor decreased from {} to {}",
            $old,
            $new
        )
    };
}

// =============================================================================
// INV-AL-02: Directory capacity
// =============================================================================

/// Assert that the chunk directory has enough chunks for a given slot index.
macro_rules! debug_assert_directory_capacity {
    ($chunk_count:expr, $required_chunk_index:expr) => {
        debug_assert!(
            $chunk_count > $required_chunk_index,
            "INV-AL-02 violated: directory has {} chunks, need index {}",
            $chunk_count,
            $required_chunk_index
        )
    };
}

// =============================================================================
// INV-AL-03: Published length never exceeds the reservation cursor
// =============================================================================

/// Assert that the contiguous published length tracked for reads never runs
/// ahead of the number of slots actually reserved.
macro_rules! debug_assert_published_bounded {
    ($published:expr, $reserved:expr) => {
        debug_assert!(
            $published <= $reserved,
            "INV-AL-03 violated: published {} exceeds reserved {}",
            $published,
            $reserved
        )
    };
}

pub(crate) use debug_assert_directory_capacity;
pub(crate) use debug_assert_monotonic_cursor;
pub(crate) use debug_assert_published_bounded;
