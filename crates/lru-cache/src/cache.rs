use std::hash::Hash;
use std::sync::atomic::{AtomicUsize, Ordering};

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use parking_lot::Mutex;

use crate::list::RecencyList;

const NO_HEAD: usize = usize::MAX;

type EvictionListener<K, V> = Box<dyn Fn(K, V) + Send + Sync>;

/// A bounded LRU cache: a concurrent index maps keys to arena slots, and a
/// single mutex-protected recency list orders those slots by use.
pub struct Cache<K, V> {
    index: DashMap<K, usize>,
    list: Mutex<RecencyList<K, V>>,
    head_hint: AtomicUsize,
    capacity: usize,
    eviction_listener: Option<EvictionListener<K, V>>,
}

impl<K, V> Cache<K, V>
where
    K: Eq + Hash + Clone,
{
    /// Creates a cache holding at most `capacity` entries.
    pub fn new(capacity: usize) -> Self {
        Self::with_eviction_listener(capacity, |_, _| {})
    }

    /// Like [`Cache::new`], but `listener` is invoked with every evicted
    /// `(key, value)` pair, after the recency list lock has been released.
    pub fn with_eviction_listener<L>(capacity: usize, listener: L) -> Self
    where
        L: Fn(K, V) + Send + Sync + 'static,
    {
        assert!(capacity > 0, "cache capacity must be positive");
        Self {
            index: DashMap::new(),
            list: Mutex::new(RecencyList::new(capacity)),
            head_hint: AtomicUsize::new(NO_HEAD),
            capacity,
            eviction_listener: Some(Box::new(listener)),
        }
    }

    /// Best-effort promotion hint: if the node is already at the head, skip
    /// taking the list lock entirely. A stale hint only costs a missed
    /// optimization, never correctness, because the real mutation always
    /// happens under the lock.
    fn touch(&self, idx: usize) {
        if self.head_hint.load(Ordering::Acquire) == idx {
            return;
        }
        let mut list = self.list.lock();
        list.move_to_head(idx);
        self.head_hint.store(idx, Ordering::Release);
    }

    /// Returns the cached value for `key`, computing and storing it on a
    /// miss. `compute` is only invoked on a miss; if it yields `Ok(None)`,
    /// nothing is cached and the absence is returned unchanged.
    pub fn get<F, E>(&self, key: &K, compute: F) -> Result<Option<V>, E>
    where
        V: Clone,
        F: FnOnce() -> Result<Option<V>, E>,
    {
        if let Some(entry) = self.index.get(key) {
            let idx = *entry;
            drop(entry);
            let value = {
                let list = self.list.lock();
                list.value(idx).clone()
            };
            self.touch(idx);
            tracing::trace!(capacity = self.capacity, "cache hit");
            return Ok(Some(value));
        }

        match compute()? {
            Some(value) => {
                self.put(key.clone(), value.clone());
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    /// Reads the cached value without promoting it, for diagnostics.
    pub fn peek(&self, key: &K) -> Option<V>
    where
        V: Clone,
    {
        let idx = *self.index.get(key)?;
        let list = self.list.lock();
        Some(list.value(idx).clone())
    }

    /// Inserts or updates `key`. Returns the prior value, if any. May evict
    /// the least-recently-used entry if this insert grows the cache past
    /// capacity.
    ///
    /// The list lock is always the outer lock for the whole call: every
    /// `self.index` access below happens while it is held, and it is never
    /// the other way around anywhere else in this type (`get`/`peek` always
    /// drop their shard guard before touching the list). A single consistent
    /// order rules out the shard-vs-list deadlock a reversed nesting would
    /// otherwise allow between two `put` calls landing on the same shard.
    pub fn put(&self, key: K, value: V) -> Option<V> {
        let mut list = self.list.lock();
        match self.index.entry(key.clone()) {
            Entry::Occupied(entry) => {
                let idx = *entry.get();
                drop(entry);
                let old = list.replace_value(idx, value);
                list.move_to_head(idx);
                self.head_hint.store(idx, Ordering::Release);
                Some(old)
            }
            Entry::Vacant(entry) => {
                let idx = list.insert_at_head(key, value);
                self.head_hint.store(idx, Ordering::Release);
                entry.insert(idx);

                let evicted = list.evict_if_over_capacity();
                if let Some((ref evicted_key, _)) = evicted {
                    self.index.remove(evicted_key);
                }
                drop(list);

                if let Some((evicted_key, evicted_value)) = evicted {
                    tracing::trace!(capacity = self.capacity, "evicted entry");
                    if let Some(listener) = &self.eviction_listener {
                        listener(evicted_key, evicted_value);
                    }
                }
                None
            }
        }
    }

    /// Number of entries currently cached.
    pub fn size(&self) -> usize {
        self.index.len()
    }

    /// The configured maximum entry count.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Whether `key` is currently cached.
    pub fn contains_key(&self, key: &K) -> bool {
        self.index.contains_key(key)
    }

    /// Empties the cache without invoking the eviction listener.
    pub fn clear(&self) {
        self.index.clear();
        let mut list = self.list.lock();
        list.clear();
        self.head_hint.store(NO_HEAD, Ordering::Release);
    }
}
