use crate::invariants::{
    debug_assert_directory_capacity, debug_assert_monotonic_cursor, debug_assert_published_bounded,
};
use arc_swap::ArcSwap;
use parking_lot::Mutex;
use std::cell::UnsafeCell;
use std::mem::MaybeUninit;
use std::ptr;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

/// A single fixed-size chunk of `chunk_size` slots.
///
/// Each slot is written at most once by the producer that reserved its index,
/// then marked `ready` with a `Release` store. Readers only ever look at a
/// slot after observing `ready == true` with an `Acquire` load, which
/// synchronizes with that store.
struct Chunk<V> {
    slots: Box<[UnsafeCell<MaybeUninit<V>>]>,
    ready: Box<[AtomicBool]>,
}

// Safety: access to `slots` is gated by `ready`, which provides the
// synchronization. Each slot has exactly one writer (the producer that
// reserved its index) and many readers after `ready` is observed true.
unsafe impl<V: Send> Send for Chunk<V> {}
unsafe impl<V: Send> Sync for Chunk<V> {}

impl<V> Chunk<V> {
    fn new(chunk_size: usize) -> Self {
        let mut slots = Vec::with_capacity(chunk_size);
        slots.resize_with(chunk_size, || UnsafeCell::new(MaybeUninit::uninit()));
        let mut ready = Vec::with_capacity(chunk_size);
        ready.resize_with(chunk_size, || AtomicBool::new(false));
        Self {
            slots: slots.into_boxed_slice(),
            ready: ready.into_boxed_slice(),
        }
    }

    /// Writes `value` into `offset` and publishes it. Must only be called
    /// once per offset (enforced by the caller via the reservation cursor).
    fn publish(&self, offset: usize, value: V) {
        // SAFETY: `offset` was uniquely reserved by the caller via the
        // cursor's fetch_add; no other writer targets this slot.
        unsafe {
            (*self.slots[offset].get()).write(value);
        }
        self.ready[offset].store(true, Ordering::Release);
    }

    /// Returns a clone of the value at `offset` if it has been published.
    fn read(&self, offset: usize) -> Option<V>
    where
        V: Clone,
    {
        if self.ready[offset].load(Ordering::Acquire) {
            // SAFETY: `ready` was observed true with Acquire, synchronizing
            // with the Release store in `publish`, so the write is visible.
            let value = unsafe { (*self.slots[offset].get()).assume_init_ref() };
            Some(value.clone())
        } else {
            None
        }
    }
}

impl<V> Drop for Chunk<V> {
    fn drop(&mut self) {
        for (offset, ready) in self.ready.iter().enumerate() {
            if *ready.get_mut() {
                // SAFETY: ready implies the slot was initialized by `publish`.
                unsafe {
                    ptr::drop_in_place((*self.slots[offset].get()).as_mut_ptr());
                }
            }
        }
    }
}

/// A growable, chunked, append-only sequence backing a single key in an
/// [`crate::AppendLog`].
///
/// Chunks are allocated on demand and never freed or moved; growth replaces
/// the chunk *directory* (the `Vec` of chunk handles) with a larger one that
/// copies the existing `Arc<Chunk<V>>` references, then atomically swaps the
/// directory pointer. Existing chunks themselves are never reallocated.
pub struct ChunkedArray<V> {
    chunk_size: usize,
    /// Next slot index to be handed out by a reservation.
    cursor: AtomicU64,
    /// The highest contiguously-published length observed so far. This is a
    /// monotonically advancing lower bound on how many of the reserved slots
    /// have actually been written; readers use it (not `cursor`) as the
    /// visible prefix bound, so a reader can never observe a reserved-but-not
    /// -yet-written slot.
    published: AtomicU64,
    directory: ArcSwap<Vec<Arc<Chunk<V>>>>,
    growth_lock: Mutex<()>,
}

impl<V> ChunkedArray<V> {
    pub fn new(chunk_size: usize) -> Self {
        assert!(chunk_size > 0, "chunk_size must be greater than 0");
        Self {
            chunk_size,
            cursor: AtomicU64::new(0),
            published: AtomicU64::new(0),
            directory: ArcSwap::from_pointee(Vec::new()),
            growth_lock: Mutex::new(()),
        }
    }

    #[inline]
    fn chunk_index(&self, i: u64) -> usize {
        (i / self.chunk_size as u64) as usize
    }

    #[inline]
    fn offset(&self, i: u64) -> usize {
        (i % self.chunk_size as u64) as usize
    }

    /// Ensures the directory contains a chunk at `chunk_idx`, growing it
    /// (doubling, per the growth policy) if necessary.
    fn ensure_chunk(&self, chunk_idx: usize) {
        // Fast path: already present.
        if chunk_idx < self.directory.load().len() {
            return;
        }

        let _guard = self.growth_lock.lock();
        // Double-checked: another thread may have grown the directory while
        // we waited for the lock.
        let current = self.directory.load();
        if chunk_idx < current.len() {
            return;
        }

        let old_len = current.len();
        let new_len = (old_len * 2).max(chunk_idx + 1);
        debug_assert_directory_capacity!(new_len, chunk_idx);

        let mut grown = Vec::with_capacity(new_len);
        grown.extend(current.iter().cloned());
        for _ in old_len..new_len {
            grown.push(Arc::new(Chunk::new(self.chunk_size)));
        }

        self.directory.store(Arc::new(grown));
        tracing::trace!(old_len, new_len, "append-log chunk directory grown");
    }

    /// Reserves and publishes a single slot. Returns the reserved index.
    pub fn add(&self, value: V) -> u64 {
        let i = self.cursor.fetch_add(1, Ordering::Relaxed);
        debug_assert_monotonic_cursor!(i, i + 1);
        self.ensure_chunk(self.chunk_index(i));

        let directory = self.directory.load();
        directory[self.chunk_index(i)].publish(self.offset(i), value);
        self.advance_published();
        tracing::trace!(index = i, "append-log value published");
        i
    }

    /// Reserves a contiguous block of `values.len()` slots and publishes them
    /// positionally, in order. Returns the first reserved index.
    pub fn add_all(&self, values: Vec<V>) -> u64 {
        if values.is_empty() {
            return self.cursor.load(Ordering::Relaxed);
        }
        let n = values.len() as u64;
        let start = self.cursor.fetch_add(n, Ordering::Relaxed);
        let end = start + n;
        debug_assert_monotonic_cursor!(start, end);
        self.ensure_chunk(self.chunk_index(end - 1));

        let directory = self.directory.load();
        for (offset_from_start, value) in values.into_iter().enumerate() {
            let i = start + offset_from_start as u64;
            directory[self.chunk_index(i)].publish(self.offset(i), value);
        }
        self.advance_published();
        tracing::trace!(start, end, "append-log batch published");
        start
    }

    /// Advances `published` to the longest contiguous prefix, out of
    /// everything *reserved so far* (`self.cursor`, not just this call's own
    /// slots), that is fully written. Called after every publish so
    /// concurrent readers see progress promptly.
    ///
    /// This must not stop at the calling producer's own reserved range: under
    /// N producers on one key, the producer that completes a lower index can
    /// race behind one that already completed a higher index, and only the
    /// lower producer's own `advance_published` call will ever be positioned
    /// to fold that higher, already-ready slot into `published`.
    fn advance_published(&self) {
        loop {
            let current = self.published.load(Ordering::Acquire);
            if current >= self.cursor.load(Ordering::Relaxed) {
                return;
            }
            let directory = self.directory.load();
            let chunk_idx = self.chunk_index(current);
            if chunk_idx >= directory.len() {
                // The chunk covering `current` hasn't shown up in this
                // thread's view of the directory yet. Whichever producer
                // grew it will also publish into it and call
                // `advance_published` again, so progress isn't lost here.
                return;
            }
            let chunk = &directory[chunk_idx];
            if !chunk.ready[self.offset(current)].load(Ordering::Acquire) {
                return;
            }
            debug_assert_published_bounded!(current + 1, self.cursor.load(Ordering::Relaxed));
            // Either we advance it or someone else did; either way, loop and
            // re-check from the new value.
            let _ = self.published.compare_exchange_weak(
                current,
                current + 1,
                Ordering::AcqRel,
                Ordering::Relaxed,
            );
        }
    }

    /// Returns the currently observed published length (the visible prefix
    /// bound used by readers).
    #[inline]
    pub fn len(&self) -> u64 {
        self.published.load(Ordering::Acquire)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns a snapshot of the currently visible prefix.
    pub fn snapshot(&self) -> Vec<V>
    where
        V: Clone,
    {
        let len = self.len();
        let directory = self.directory.load();
        let mut out = Vec::with_capacity(len as usize);
        for i in 0..len {
            let chunk = &directory[self.chunk_index(i)];
            match chunk.read(self.offset(i)) {
                Some(v) => out.push(v),
                None => break, // concurrent shrink-from-our-view is impossible; defensive only
            }
        }
        out
    }

    /// Number of chunks currently allocated.
    pub fn chunk_count(&self) -> usize {
        self.directory.load().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_add_and_snapshot() {
        let arr = ChunkedArray::<u64>::new(4);
        for i in 0..10u64 {
            arr.add(i);
        }
        assert_eq!(arr.len(), 10);
        assert_eq!(arr.snapshot(), (0..10).collect::<Vec<_>>());
        assert!(arr.chunk_count() >= 3);
    }

    #[test]
    fn add_all_is_positional() {
        let arr = ChunkedArray::<u64>::new(4);
        arr.add_all(vec![1, 2, 3, 4, 5]);
        assert_eq!(arr.snapshot(), vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn monotonic_prefix_under_growth() {
        let arr = ChunkedArray::<u64>::new(2);
        let mut seen_len = 0u64;
        for i in 0..50u64 {
            arr.add(i);
            let snap = arr.snapshot();
            assert!(snap.len() as u64 >= seen_len);
            seen_len = snap.len() as u64;
            assert_eq!(snap, (0..=i).collect::<Vec<_>>());
        }
    }

    #[test]
    fn multi_producer_disjoint_offsets_no_loss() {
        use std::thread;

        let arr = Arc::new(ChunkedArray::<u64>::new(64));
        let threads = 8usize;
        let per_thread = 2000u64;

        let handles: Vec<_> = (0..threads)
            .map(|t| {
                let arr = Arc::clone(&arr);
                thread::spawn(move || {
                    for i in 0..per_thread {
                        arr.add(t as u64 * per_thread + i);
                    }
                })
            })
            .collect();

        for h in handles {
            h.join().unwrap();
        }

        assert_eq!(arr.len(), threads as u64 * per_thread);
        let mut snap = arr.snapshot();
        snap.sort_unstable();
        let expected: Vec<u64> = (0..threads as u64 * per_thread).collect();
        assert_eq!(snap, expected);
    }
}
