use std::sync::Arc;

use dashmap::DashMap;

use crate::message::Message;
use crate::topic::Topic;

/// A partitioned in-memory log: each named topic is an independent
/// append-only sequence, polled by independent named consumer groups.
pub struct PubSub<K, V> {
    topics: DashMap<String, Arc<Topic<K, V>>>,
}

impl<K, V> Default for PubSub<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> PubSub<K, V> {
    pub fn new() -> Self {
        Self {
            topics: DashMap::new(),
        }
    }

    fn topic(&self, name: &str) -> Arc<Topic<K, V>> {
        if let Some(topic) = self.topics.get(name) {
            return Arc::clone(&topic);
        }
        let created = Arc::new(Topic::new());
        let topic = self
            .topics
            .entry(name.to_string())
            .or_insert_with(|| created);
        Arc::clone(&topic)
    }

    /// Returns a handle for producing to `topic`, creating it lazily if it
    /// does not exist yet.
    pub fn producer(&self, topic: &str) -> Producer<K, V> {
        tracing::trace!(topic, "producer handle created");
        Producer {
            topic: self.topic(topic),
        }
    }

    /// Returns a handle for consuming `topic` as `group`, creating both
    /// lazily if they do not exist yet.
    pub fn consumer(&self, topic: &str, group: &str) -> Consumer<K, V> {
        let topic_handle = self.topic(topic);
        topic_handle.ensure_group(group);
        tracing::trace!(topic, group, "consumer handle created");
        Consumer {
            topic: topic_handle,
            group: group.to_string(),
        }
    }

    /// Number of messages ever sent to `topic` (0 if it does not exist).
    pub fn topic_len(&self, topic: &str) -> u64 {
        self.topics.get(topic).map_or(0, |t| t.len())
    }

    /// `group`'s committed offset on `topic` (0 if either does not exist).
    pub fn group_offset(&self, topic: &str, group: &str) -> u64 {
        self.topics.get(topic).map_or(0, |t| t.group_offset(group))
    }

    /// Names of every topic created so far.
    pub fn topics(&self) -> Vec<String> {
        self.topics.iter().map(|e| e.key().clone()).collect()
    }

    /// Names of every consumer group registered on `topic`.
    pub fn groups(&self, topic: &str) -> Vec<String> {
        self.topics
            .get(topic)
            .map(|t| t.group_names())
            .unwrap_or_default()
    }
}

/// A handle for appending messages to one topic.
pub struct Producer<K, V> {
    topic: Arc<Topic<K, V>>,
}

impl<K, V> Producer<K, V> {
    /// Appends `(key, value)` to the topic. Always succeeds while the
    /// process is alive.
    pub fn send(&self, key: K, value: V) {
        self.topic.send(key, value);
    }
}

/// A handle for polling and committing one consumer group on one topic.
pub struct Consumer<K, V> {
    topic: Arc<Topic<K, V>>,
    group: String,
}

impl<K, V> Consumer<K, V> {
    /// Returns up to `max_n` messages after the group's committed offset,
    /// without advancing it.
    pub fn poll(&self, max_n: usize) -> Vec<Message<K, V>>
    where
        K: Clone,
        V: Clone,
    {
        self.topic.poll(&self.group, max_n)
    }

    /// Advances this group's committed offset. A no-op if `new_offset` is
    /// not greater than the current offset.
    pub fn commit(&self, new_offset: u64) {
        self.topic.commit(&self.group, new_offset);
    }

    /// This group's current committed offset.
    pub fn offset(&self) -> u64 {
        self.topic.group_offset(&self.group)
    }
}
