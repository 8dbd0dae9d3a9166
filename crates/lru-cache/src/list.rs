use crate::invariants::{debug_assert_capacity_bound, debug_assert_list_consistent};

/// One entry in the recency list, addressed by its stable arena index rather
/// than by pointer: the concurrent index (`DashMap<K, usize>`) stores these
/// indices, so a node never has to be `Arc`-shared or self-referential.
pub(crate) struct Node<K, V> {
    pub(crate) key: K,
    pub(crate) value: V,
    prev: Option<usize>,
    next: Option<usize>,
}

/// The recency list itself: an arena of nodes plus a free list so evicted
/// slots are recycled instead of growing the arena without bound.
pub(crate) struct RecencyList<K, V> {
    arena: Vec<Option<Node<K, V>>>,
    free: Vec<usize>,
    head: Option<usize>,
    tail: Option<usize>,
    len: usize,
    capacity: usize,
}

impl<K, V> RecencyList<K, V> {
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            arena: Vec::new(),
            free: Vec::new(),
            head: None,
            tail: None,
            len: 0,
            capacity,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.len
    }

    pub(crate) fn head(&self) -> Option<usize> {
        self.head
    }

    fn node(&self, idx: usize) -> &Node<K, V> {
        self.arena[idx]
            .as_ref()
            .expect("arena slot referenced by the index must be live")
    }

    fn node_mut(&mut self, idx: usize) -> &mut Node<K, V> {
        self.arena[idx]
            .as_mut()
            .expect("arena slot referenced by the index must be live")
    }

    pub(crate) fn value(&self, idx: usize) -> &V {
        &self.node(idx).value
    }

    pub(crate) fn replace_value(&mut self, idx: usize, value: V) -> V {
        std::mem::replace(&mut self.node_mut(idx).value, value)
    }

    /// Splices a brand-new node in at the head. Caller is responsible for
    /// publishing `idx` into the concurrent index.
    pub(crate) fn insert_at_head(&mut self, key: K, value: V) -> usize {
        let node = Node {
            key,
            value,
            prev: None,
            next: self.head,
        };
        let idx = match self.free.pop() {
            Some(idx) => {
                self.arena[idx] = Some(node);
                idx
            }
            None => {
                self.arena.push(Some(node));
                self.arena.len() - 1
            }
        };
        if let Some(old_head) = self.head {
            self.node_mut(old_head).prev = Some(idx);
        } else {
            self.tail = Some(idx);
        }
        self.head = Some(idx);
        self.len += 1;
        debug_assert_list_consistent!(self.head, self.tail, self.len);
        idx
    }

    fn unlink(&mut self, idx: usize) {
        let (prev, next) = {
            let node = self.node(idx);
            (node.prev, node.next)
        };
        match prev {
            Some(p) => self.node_mut(p).next = next,
            None => self.head = next,
        }
        match next {
            Some(n) => self.node_mut(n).prev = prev,
            None => self.tail = prev,
        }
    }

    /// Unlinks `idx` and relinks it at the head. A no-op if it is already
    /// there.
    pub(crate) fn move_to_head(&mut self, idx: usize) {
        if self.head == Some(idx) {
            return;
        }
        self.unlink(idx);
        let node = self.node_mut(idx);
        node.prev = None;
        node.next = self.head;
        if let Some(old_head) = self.head {
            self.node_mut(old_head).prev = Some(idx);
        }
        self.head = Some(idx);
        if self.tail.is_none() {
            self.tail = Some(idx);
        }
        debug_assert_list_consistent!(self.head, self.tail, self.len);
    }

    /// Removes the least-recently-used entry, if the list is over capacity.
    /// Returns the evicted `(key, value)` so the caller can remove it from
    /// the concurrent index and notify an eviction listener.
    pub(crate) fn evict_if_over_capacity(&mut self) -> Option<(K, V)> {
        debug_assert_capacity_bound!(self.len.saturating_sub(1), self.capacity);
        if self.len <= self.capacity {
            return None;
        }
        let idx = self.tail?;
        self.unlink(idx);
        let node = self.arena[idx].take().expect("tail index must be live");
        self.free.push(idx);
        self.len -= 1;
        debug_assert_list_consistent!(self.head, self.tail, self.len);
        Some((node.key, node.value))
    }

    pub(crate) fn clear(&mut self) {
        self.arena.clear();
        self.free.clear();
        self.head = None;
        self.tail = None;
        self.len = 0;
    }
}
