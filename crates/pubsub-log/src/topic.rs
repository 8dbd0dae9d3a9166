use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use parking_lot::RwLock;

use crate::invariants::{debug_assert_offset_bounded, debug_assert_offset_monotonic};
use crate::message::{now_millis, Message};

/// One topic's append-only log plus its independent consumer-group offsets.
///
/// The message vector is guarded by a plain `RwLock`; `len_hint` mirrors its
/// length so `poll` can answer "nothing new since my last offset" without
/// ever taking the lock, an optimistic-read fast path standing in for a
/// stamped lock. Group offsets are plain `AtomicU64`s rather than values
/// behind the same lock: advancing one is a lock-free compare-and-swap loop,
/// so polling one group never contends with committing another.
pub(crate) struct Topic<K, V> {
    messages: RwLock<Vec<Message<K, V>>>,
    len_hint: AtomicU64,
    groups: DashMap<String, AtomicU64>,
}

impl<K, V> Topic<K, V> {
    pub(crate) fn new() -> Self {
        Self {
            messages: RwLock::new(Vec::new()),
            len_hint: AtomicU64::new(0),
            groups: DashMap::new(),
        }
    }

    pub(crate) fn send(&self, key: K, value: V) {
        let timestamp_millis = now_millis();
        let mut messages = self.messages.write();
        messages.push(Message {
            key,
            value,
            timestamp_millis,
        });
        self.len_hint.store(messages.len() as u64, Ordering::Release);
    }

    pub(crate) fn len(&self) -> u64 {
        self.messages.read().len() as u64
    }

    /// Registers `group` with a committed offset of 0 if it does not exist
    /// yet. Idempotent.
    pub(crate) fn ensure_group(&self, group: &str) {
        if !self.groups.contains_key(group) {
            self.groups
                .entry(group.to_string())
                .or_insert_with(|| AtomicU64::new(0));
        }
    }

    pub(crate) fn group_offset(&self, group: &str) -> u64 {
        self.ensure_group(group);
        self.groups
            .get(group)
            .map(|g| g.load(Ordering::Acquire))
            .unwrap_or(0)
    }

    pub(crate) fn group_names(&self) -> Vec<String> {
        self.groups.iter().map(|e| e.key().clone()).collect()
    }

    /// Returns up to `max_n` messages starting at `group`'s committed
    /// offset. Does not advance the offset.
    pub(crate) fn poll(&self, group: &str, max_n: usize) -> Vec<Message<K, V>>
    where
        K: Clone,
        V: Clone,
    {
        let offset = self.group_offset(group);
        if offset >= self.len_hint.load(Ordering::Acquire) {
            return Vec::new();
        }
        let messages = self.messages.read();
        let start = offset as usize;
        if start >= messages.len() {
            return Vec::new();
        }
        let end = (start + max_n).min(messages.len());
        debug_assert_offset_bounded!(offset, messages.len() as u64);
        messages[start..end].to_vec()
    }

    /// Advances `group`'s committed offset to `new_offset` if that is a true
    /// advance. A no-op if `new_offset` is not greater than the current
    /// offset.
    pub(crate) fn commit(&self, group: &str, new_offset: u64) {
        self.ensure_group(group);
        let counter = self
            .groups
            .get(group)
            .expect("group was just ensured to exist");

        let mut current = counter.load(Ordering::Acquire);
        while new_offset > current {
            debug_assert_offset_monotonic!(current, new_offset);
            match counter.compare_exchange_weak(
                current,
                new_offset,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => {
                    tracing::trace!(group, new_offset, "consumer group committed");
                    break;
                }
                Err(observed) => current = observed,
            }
        }
    }
}
