use parking_lot::{Condvar, Mutex};

use crate::error::PoolError;
use crate::invariants::debug_assert_permits_bounded;

/// A counting semaphore with a terminal "closed" state.
///
/// Unlike a plain semaphore, `close()` wakes every blocked `acquire()` so that
/// a thread parked waiting for a permit does not outlive the pool it belongs
/// to.
pub(crate) struct Permits {
    state: Mutex<State>,
    cv: Condvar,
    max: usize,
}

struct State {
    available: usize,
    closed: bool,
}

impl Permits {
    pub(crate) fn new(max: usize) -> Self {
        Self {
            state: Mutex::new(State {
                available: max,
                closed: false,
            }),
            cv: Condvar::new(),
            max,
        }
    }

    pub(crate) fn acquire(&self) -> Result<(), PoolError> {
        let mut state = self.state.lock();
        loop {
            if state.closed {
                return Err(PoolError::Closed);
            }
            if state.available > 0 {
                state.available -= 1;
                return Ok(());
            }
            self.cv.wait(&mut state);
        }
    }

    pub(crate) fn try_acquire(&self) -> Result<(), PoolError> {
        let mut state = self.state.lock();
        if state.closed {
            return Err(PoolError::Closed);
        }
        if state.available == 0 {
            return Err(PoolError::WouldBlock);
        }
        state.available -= 1;
        Ok(())
    }

    pub(crate) fn release(&self) {
        let mut state = self.state.lock();
        state.available += 1;
        debug_assert_permits_bounded!(state.available, self.max);
        self.cv.notify_one();
    }

    pub(crate) fn close(&self) {
        let mut state = self.state.lock();
        state.closed = true;
        self.cv.notify_all();
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.state.lock().closed
    }
}
