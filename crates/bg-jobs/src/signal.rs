//! `CycleSignal` — manual-reset completion event for the commit barrier.

use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

/// How the last stage of a cycle ended.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum BatchEnd {
    Completed,
    Aborted,
}

/// A manual-reset event carrying a [`BatchEnd`].
///
/// Once set, every waiter observes the same value until [`reset`](Self::reset).
#[derive(Default)]
pub struct CycleSignal {
    state: Mutex<Option<BatchEnd>>,
    cvar:  Condvar,
}

impl CycleSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&self) {
        *self.state.lock() = None;
    }

    /// Set the event and wake every waiter.  A second `set` before `reset`
    /// keeps the first value.
    pub fn set(&self, end: BatchEnd) {
        let mut state = self.state.lock();
        if state.is_none() {
            *state = Some(end);
        }
        self.cvar.notify_all();
    }

    /// Current value without blocking.
    pub fn peek(&self) -> Option<BatchEnd> {
        *self.state.lock()
    }

    /// Block until the event is set or `timeout` elapses.
    ///
    /// Returns `None` on timeout.  A timeout too large to express as a
    /// deadline waits without one.
    pub fn wait_timeout(&self, timeout: Duration) -> Option<BatchEnd> {
        let deadline  = Instant::now().checked_add(timeout);
        let mut state = self.state.lock();
        while state.is_none() {
            match deadline {
                Some(deadline) => {
                    if self.cvar.wait_until(&mut state, deadline).timed_out() {
                        break;
                    }
                }
                None => self.cvar.wait(&mut state),
            }
        }
        *state
    }
}
