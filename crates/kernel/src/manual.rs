//! Hand-driven clock and frame source for headless runs and tests.
//!
//! Both types are cheap handles: clones share state, so a test can keep one
//! copy while the scheduler owns the other.

use crate::scheduler::{Clock, FrameRequester, FrameToken};
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;
use std::time::{Duration, Instant};

/// A clock that only moves when told to.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Rc<Cell<Instant>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            now: Rc::new(Cell::new(Instant::now())),
        }
    }

    /// Move the clock forward. Returns false, leaving the clock where it
    /// was, if the later instant is not representable.
    pub fn advance(&self, by: Duration) -> bool {
        match self.now.get().checked_add(by) {
            Some(later) => {
                self.now.set(later);
                true
            }
            None => false,
        }
    }

    /// Negative seconds count as zero. Non-finite or out-of-range values
    /// leave the clock unchanged and return false.
    pub fn advance_secs(&self, seconds: f32) -> bool {
        Duration::try_from_secs_f32(seconds.max(0.0)).is_ok_and(|by| self.advance(by))
    }

    /// Move the clock backwards. Leaves it unchanged if the earlier instant
    /// is not representable.
    pub fn rewind_secs(&self, seconds: f32) {
        let Ok(by) = Duration::try_from_secs_f32(seconds.max(0.0)) else {
            return;
        };
        if let Some(earlier) = self.now.get().checked_sub(by) {
            self.now.set(earlier);
        }
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.now.get()
    }
}

#[derive(Debug, Default)]
struct FrameQueue {
    next_id: u64,
    pending: VecDeque<FrameToken>,
    cancelled: Vec<FrameToken>,
    requested: u64,
}

/// A frame source whose callbacks are delivered by the caller.
///
/// Requests queue up; [`ManualFrames::take_next`] pops the oldest one for
/// delivery to the scheduler.
#[derive(Debug, Clone, Default)]
pub struct ManualFrames {
    queue: Rc<RefCell<FrameQueue>>,
}

impl ManualFrames {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn take_next(&self) -> Option<FrameToken> {
        self.queue.borrow_mut().pending.pop_front()
    }

    pub fn peek(&self) -> Option<FrameToken> {
        self.queue.borrow().pending.front().copied()
    }

    pub fn pending_count(&self) -> usize {
        self.queue.borrow().pending.len()
    }

    pub fn requested(&self) -> u64 {
        self.queue.borrow().requested
    }

    pub fn cancelled(&self) -> Vec<FrameToken> {
        self.queue.borrow().cancelled.clone()
    }
}

impl FrameRequester for ManualFrames {
    fn request_frame(&mut self) -> FrameToken {
        let mut queue = self.queue.borrow_mut();
        queue.next_id += 1;
        queue.requested += 1;
        let token = FrameToken(queue.next_id);
        queue.pending.push_back(token);
        token
    }

    fn cancel_frame(&mut self, token: FrameToken) {
        let mut queue = self.queue.borrow_mut();
        queue.pending.retain(|t| *t != token);
        queue.cancelled.push(token);
    }
}
