//! Debug assertion macros for pubsub-log invariants.
//!
//! These are only active in debug builds (`#[cfg(debug_assertions)]`), so
//! there is zero overhead in release builds.

// =============================================================================
// INV-PS-01: Committed offset never exceeds topic length
// =============================================================================

/// Assert that a group's committed offset never runs ahead of the messages
/// actually appended to the topic.
macro_rules! debug_assert_offset_bounded {
    ($offset:expr, $topic_len:expr) => {
        debug_assert!(
            $offset <= $topic_len,
            "INV-PS-01 violated: committed offset {} exceeds topic length {}",
            $offset,
            $topic_len
        )
    };
}

// =============================================================================
// INV-PS-02: Committed offset is monotonically non-decreasing
// =============================================================================

/// Assert that a commit never moves a group's offset backwards.
macro_rules! debug_assert_offset_monotonic {
    ($old:expr, $new:expr) => {
        debug_assert!(
            $new >= $old,
            "INV-PS-02 violated: offset moved backwards from {} to {}",
            $old,
            $new
        )
    };
}

pub(crate) use debug_assert_offset_bounded;
pub(crate) use debug_assert_offset_monotonic;
