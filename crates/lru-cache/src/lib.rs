//! Cache - A Bounded LRU Cache
//!
//! A concurrent index (`DashMap<K, usize>`) maps keys to slots in an arena of
//! recency-list nodes. Promotion and eviction are serialized behind a single
//! list lock; everything else (lookups that hit) is as contention-free as
//! the underlying concurrent map allows.
//!
//! # Example
//!
//! ```
//! use lru_cache::Cache;
//!
//! let cache: Cache<&str, u32> = Cache::new(2);
//! cache.put("a", 1);
//! cache.put("b", 2);
//! cache.put("c", 3); // evicts "a", the least recently used
//!
//! assert!(!cache.contains_key(&"a"));
//! assert_eq!(cache.peek(&"c"), Some(3));
//! ```

mod cache;
mod invariants;
mod list;

pub use cache::Cache;
