use std::time::{SystemTime, UNIX_EPOCH};

/// A single record in a topic's append-only log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message<K, V> {
    pub key: K,
    pub value: V,
    /// Wall-clock milliseconds since the Unix epoch, assigned at enqueue.
    /// Not guaranteed monotonic across messages: the clock can be adjusted
    /// between two sends.
    pub timestamp_millis: u64,
}

pub(crate) fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
