//! Debug assertion macros for actor-system invariants.
//!
//! These are only active in debug builds, so there is zero overhead in
//! release builds.

// =============================================================================
// INV-AS-01: Mailbox capacity
// =============================================================================

/// Assert that a mailbox never holds more messages than its configured
/// capacity.
macro_rules! debug_assert_mailbox_capacity {
    ($len:expr, $capacity:expr) => {
        debug_assert!(
            $len <= $capacity,
            "INV-AS-01 violated: mailbox length {} exceeds capacity {}",
            $len,
            $capacity
        )
    };
}

// =============================================================================
// INV-AS-02: At most one worker drains a given actor at a time
// =============================================================================

/// Mark entry into an actor's drain loop; panics in debug builds if another
/// worker is already inside it for the same actor. Cost is a single swap,
/// compiled out entirely in release builds.
macro_rules! debug_assert_exclusive_drain_enter {
    ($flag:expr) => {
        if cfg!(debug_assertions) {
            let already_draining = $flag.swap(true, std::sync::atomic::Ordering::AcqRel);
            debug_assert!(
                !already_draining,
                "INV-AS-02 violated: two workers entered the same actor's drain loop"
            );
        }
    };
}

/// Mark exit from an actor's drain loop, pairing with
/// [`debug_assert_exclusive_drain_enter`].
macro_rules! debug_assert_exclusive_drain_exit {
    ($flag:expr) => {
        if cfg!(debug_assertions) {
            $flag.store(false, std::sync::atomic::Ordering::Release);
        }
    };
}

pub(crate) use debug_assert_exclusive_drain_enter;
pub(crate) use debug_assert_exclusive_drain_exit;
pub(crate) use debug_assert_mailbox_capacity;
