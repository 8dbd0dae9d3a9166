use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use crossbeam_queue::ArrayQueue;

use crate::invariants::debug_assert_mailbox_capacity;

type Handler<M> = Box<dyn Fn(M) + Send + Sync>;

/// Per-actor state: identity, mailbox, handler, and the single-bit
/// `scheduled` flag that guarantees at most one worker ever drains this
/// actor's mailbox at a time.
pub(crate) struct ActorContext<M> {
    pub(crate) id: String,
    pub(crate) mailbox: ArrayQueue<M>,
    pub(crate) handler: Handler<M>,
    pub(crate) scheduled: AtomicBool,
    #[cfg(debug_assertions)]
    pub(crate) draining: AtomicBool,
}

impl<M> ActorContext<M> {
    pub(crate) fn new<F>(id: String, mailbox_capacity: usize, handler: F) -> Self
    where
        F: Fn(M) + Send + Sync + 'static,
    {
        Self {
            id,
            mailbox: ArrayQueue::new(mailbox_capacity.max(1)),
            handler: Box::new(handler),
            scheduled: AtomicBool::new(false),
            #[cfg(debug_assertions)]
            draining: AtomicBool::new(false),
        }
    }

    /// Offers `msg` to the mailbox without blocking. Returns `true` on
    /// success, `false` if the mailbox is full.
    pub(crate) fn offer(&self, msg: M) -> bool {
        let accepted = self.mailbox.push(msg).is_ok();
        debug_assert_mailbox_capacity!(self.mailbox.len(), self.mailbox.capacity());
        accepted
    }

    pub(crate) fn mailbox_len(&self) -> usize {
        self.mailbox.len()
    }
}
