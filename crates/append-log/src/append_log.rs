use crate::chunked_array::ChunkedArray;
use dashmap::DashMap;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Default chunk size (C) used by a [`ChunkedArray`] when none is specified.
pub const DEFAULT_CHUNK_SIZE: usize = 1024;

/// A thread-safe multimap where, for each key, values form an append-only,
/// chunked sequence supporting lock-free reads.
///
/// A key's sequence comes into existence the first time it is touched by
/// [`AppendLog::add`], [`AppendLog::add_all`], or [`AppendLog::register_key`]
/// — whichever happens first, concurrently or not. There is no "unknown key"
/// error: a fresh key just starts with an empty sequence.
pub struct AppendLog<K, V> {
    keys: DashMap<K, Arc<ChunkedArray<V>>>,
    chunk_size: usize,
    total: AtomicU64,
}

impl<K, V> Default for AppendLog<K, V>
where
    K: Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> AppendLog<K, V>
where
    K: Eq + Hash,
{
    /// Creates an empty log using the default chunk size.
    pub fn new() -> Self {
        Self::with_chunk_size(DEFAULT_CHUNK_SIZE)
    }

    /// Creates an empty log with a custom chunk size `C`.
    pub fn with_chunk_size(chunk_size: usize) -> Self {
        Self {
            keys: DashMap::new(),
            chunk_size,
            total: AtomicU64::new(0),
        }
    }

    /// Idempotently ensures `k` has a (possibly empty) sequence. Safe to call
    /// concurrently from multiple threads racing to create the same key.
    pub fn register_key(&self, k: K) {
        self.keys
            .entry(k)
            .or_insert_with(|| Arc::new(ChunkedArray::new(self.chunk_size)));
    }

    /// Returns `k`'s backing array, creating it on first use. Safe to call
    /// concurrently from multiple threads racing on the same fresh key: only
    /// one `ChunkedArray` is ever installed, via `DashMap`'s entry API.
    fn array_for(&self, k: &K) -> Arc<ChunkedArray<V>>
    where
        K: Clone,
    {
        Arc::clone(
            self.keys
                .entry(k.clone())
                .or_insert_with(|| Arc::new(ChunkedArray::new(self.chunk_size)))
                .value(),
        )
    }

    /// Appends `v` to `k`'s sequence, creating the sequence if `k` has not
    /// been seen before.
    pub fn add(&self, k: &K, v: V)
    where
        K: Clone,
    {
        self.array_for(k).add(v);
        self.total.fetch_add(1, Ordering::Relaxed);
    }

    /// Appends all of `values`, in order, to `k`'s sequence, creating the
    /// sequence if `k` has not been seen before. Reservation of the slots is
    /// atomic; visibility of individual elements to concurrent readers is not
    /// (they may appear one by one).
    pub fn add_all(&self, k: &K, values: Vec<V>)
    where
        K: Clone,
    {
        let array = self.array_for(k);
        let n = values.len() as u64;
        array.add_all(values);
        self.total.fetch_add(n, Ordering::Relaxed);
    }

    /// Returns a snapshot of `k`'s sequence as observed at call time. Returns
    /// an empty list for an unregistered key (this is not an error: `get` is
    /// a read, and an absent key simply has no values yet).
    pub fn get(&self, k: &K) -> Vec<V>
    where
        V: Clone,
    {
        self.keys
            .get(k)
            .map(|entry| entry.value().snapshot())
            .unwrap_or_default()
    }

    /// Returns a finite, non-restartable iterator bounded by the cursor
    /// observed at call time.
    pub fn iterator(&self, k: &K) -> std::vec::IntoIter<V>
    where
        V: Clone,
    {
        self.get(k).into_iter()
    }

    /// Equivalent to [`AppendLog::iterator`]; named for callers (like a
    /// shuffle stage) that think in terms of a stream rather than an
    /// iterator.
    pub fn stream(&self, k: &K) -> std::vec::IntoIter<V>
    where
        V: Clone,
    {
        self.iterator(k)
    }

    /// Applies `f` to every value currently visible under `k`, in order.
    pub fn for_each<F>(&self, k: &K, mut f: F)
    where
        V: Clone,
        F: FnMut(V),
    {
        for v in self.stream(k) {
            f(v);
        }
    }

    /// Returns all registered keys.
    pub fn key_set(&self) -> Vec<K>
    where
        K: Clone,
    {
        self.keys.iter().map(|entry| entry.key().clone()).collect()
    }

    /// Returns the number of registered keys.
    pub fn key_count(&self) -> usize {
        self.keys.len()
    }

    /// Returns the total number of elements observed across all keys. This
    /// counts successful reservations, which may run slightly ahead of what
    /// a concurrent `get` would see for a key that is still being published.
    pub fn size(&self) -> u64 {
        self.total.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_auto_vivifies_an_unseen_key() {
        let log: AppendLog<&str, u64> = AppendLog::new();
        log.add(&"missing", 1);
        assert_eq!(log.get(&"missing"), vec![1]);
        assert_eq!(log.key_count(), 1);
    }

    #[test]
    fn add_all_auto_vivifies_an_unseen_key() {
        let log: AppendLog<&str, u64> = AppendLog::new();
        log.add_all(&"missing", vec![1, 2, 3]);
        assert_eq!(log.get(&"missing"), vec![1, 2, 3]);
    }

    #[test]
    fn scenario_a_chunked_growth() {
        let log: AppendLog<&str, u64> = AppendLog::with_chunk_size(4);
        for i in 0..10u64 {
            log.add(&"k", i);
        }
        assert_eq!(log.get(&"k"), (0..10).collect::<Vec<_>>());
        assert_eq!(log.size(), 10);
    }

    #[test]
    fn add_all_preserves_order() {
        let log: AppendLog<&str, u64> = AppendLog::with_chunk_size(4);
        log.add_all(&"k", vec![1, 2, 3]);
        log.add_all(&"k", vec![4, 5]);
        assert_eq!(log.get(&"k"), vec![1, 2, 3, 4, 5]);
        assert_eq!(log.size(), 5);
    }

    #[test]
    fn independent_keys() {
        let log: AppendLog<&str, u64> = AppendLog::with_chunk_size(4);
        log.add(&"a", 1);
        log.add(&"b", 2);
        assert_eq!(log.get(&"a"), vec![1]);
        assert_eq!(log.get(&"b"), vec![2]);
        assert_eq!(log.key_count(), 2);
    }

    #[test]
    fn monotonicity_across_calls() {
        let log: AppendLog<&str, u64> = AppendLog::with_chunk_size(4);
        for i in 0..20u64 {
            log.add(&"k", i);
            let before = log.get(&"k");
            let after = log.get(&"k");
            assert_eq!(&after[..before.len()], &before[..]);
        }
    }
}
