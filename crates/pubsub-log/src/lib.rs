//! PubSub - A Partitioned In-Memory Log
//!
//! Each named topic is an independent append-only sequence of messages;
//! independent named consumer groups track their own committed offset into
//! that sequence. Nothing is ever removed, and a group's offset only ever
//! moves forward.
//!
//! # Example
//!
//! ```
//! use pubsub_log::PubSub;
//!
//! let bus: PubSub<&str, &str> = PubSub::new();
//! bus.producer("orders").send("key", "1");
//!
//! let consumer = bus.consumer("orders", "billing");
//! let batch = consumer.poll(10);
//! assert_eq!(batch.len(), 1);
//! consumer.commit(1);
//! assert!(consumer.poll(10).is_empty());
//! ```

mod invariants;
mod message;
mod pubsub;
mod topic;

pub use message::Message;
pub use pubsub::{Consumer, PubSub, Producer};
