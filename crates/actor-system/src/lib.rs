//! ActorSystem - A Mailbox Scheduler Over a Fixed Worker Pool
//!
//! A scheduler that multiplexes many single-consumer mailboxes onto a fixed
//! worker pool, guaranteeing at most one worker executes a given actor's
//! handler at any instant. Messages enqueued by the same producer thread to
//! the same actor are handled in that order; across producer threads,
//! relative order is best-effort.
//!
//! # Example
//!
//! ```
//! use actor_system::ActorSystem;
//! use std::sync::atomic::{AtomicU64, Ordering};
//! use std::sync::Arc;
//!
//! let system: ActorSystem<u64> = ActorSystem::new(2);
//! let total = Arc::new(AtomicU64::new(0));
//! let t = Arc::clone(&total);
//! let actor = system.register("counter", 8, move |n| {
//!     t.fetch_add(n, Ordering::SeqCst);
//! }).unwrap();
//!
//! assert!(actor.send(1));
//! assert!(actor.send(2));
//! system.shutdown_and_join();
//! assert_eq!(total.load(Ordering::SeqCst), 3);
//! ```

mod context;
mod error;
mod invariants;
mod system;

pub use error::ActorSystemError;
pub use system::{ActorHandle, ActorSystem};
