//! AppendLog - Thread-Safe Chunked Append-Only Multimap
//!
//! A concurrent multimap where, for each key, values form an append-only,
//! chunked sequence supporting lock-free reads. Growth replaces the chunk
//! *directory* (never the chunks themselves), so in-flight readers always see
//! a consistent, never-reallocated view of already-published chunks.
//!
//! # Example
//!
//! ```
//! use append_log::AppendLog;
//!
//! let log: AppendLog<&str, u64> = AppendLog::with_chunk_size(4);
//! log.add(&"shuffle-key", 1);
//! log.add_all(&"shuffle-key", vec![2, 3, 4]);
//!
//! assert_eq!(log.get(&"shuffle-key"), vec![1, 2, 3, 4]);
//! ```

mod append_log;
mod chunked_array;
mod invariants;

pub use append_log::{AppendLog, DEFAULT_CHUNK_SIZE};
pub use chunked_array::ChunkedArray;
