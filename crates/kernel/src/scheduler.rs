//! Frame scheduling: a self-perpetuating loop driven by an external
//! display-refresh signal.
//!
//! ```text
//!   Idle ──start()──> Running ──stop()──> Idle
//!                      │   ▲
//!           on_frame() │   │ request_frame()
//!                      ▼   │
//!                    [tick: controller, scene, selector]
//! ```
//!
//! Each frame callback carries the [`FrameToken`] handed out when it was
//! requested. Only the token of the single outstanding request is honored,
//! so a callback that fires after `stop()` (or after a restart) does nothing.

use crate::error::FrameError;
use crate::selector::RenderPath;
use std::time::Instant;

/// Identifies one requested frame callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameToken(pub u64);

/// Source of frame callbacks (a display-refresh signal, a window redraw, a
/// test harness).
pub trait FrameRequester {
    /// Ask for one callback. The host later delivers the returned token.
    fn request_frame(&mut self) -> FrameToken;
    /// Withdraw an outstanding request.
    fn cancel_frame(&mut self, token: FrameToken);
}

/// Monotonic time source.
pub trait Clock {
    fn now(&self) -> Instant;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// The work done in one tick.
pub trait FrameHandler {
    fn run_frame(&mut self, elapsed_seconds: f32) -> Result<RenderPath, FrameError>;
}

/// What a frame callback did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    Rendered(RenderPath),
    /// The tick failed; it was logged and the loop continues.
    Faulted,
    /// Scheduler idle or token stale; nothing ran.
    Ignored,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameStats {
    pub frames: u64,
    pub primary_frames: u64,
    pub fallback_frames: u64,
    pub faults: u64,
    pub last_elapsed: f32,
}

#[derive(Debug)]
enum State {
    Idle,
    Running {
        last: Instant,
        pending: Option<FrameToken>,
    },
}

/// Drives the Idle → Running → Idle lifecycle of the frame loop.
///
/// Dropping a running scheduler stops it, cancelling the outstanding request.
pub struct FrameScheduler<R: FrameRequester, C: Clock = SystemClock> {
    requester: R,
    clock: C,
    state: State,
    stats: FrameStats,
}

impl<R: FrameRequester> FrameScheduler<R, SystemClock> {
    pub fn new(requester: R) -> Self {
        Self::with_clock(requester, SystemClock)
    }
}

impl<R: FrameRequester, C: Clock> FrameScheduler<R, C> {
    pub fn with_clock(requester: R, clock: C) -> Self {
        Self {
            requester,
            clock,
            state: State::Idle,
            stats: FrameStats::default(),
        }
    }

    pub fn is_running(&self) -> bool {
        matches!(self.state, State::Running { .. })
    }

    /// The token of the outstanding request, if any.
    pub fn pending(&self) -> Option<FrameToken> {
        match self.state {
            State::Running { pending, .. } => pending,
            State::Idle => None,
        }
    }

    pub fn stats(&self) -> &FrameStats {
        &self.stats
    }

    pub fn requester(&self) -> &R {
        &self.requester
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Idle → Running. Captures the initial timestamp and requests the first
    /// frame. Returns false if already running.
    pub fn start(&mut self) -> bool {
        if self.is_running() {
            tracing::warn!("frame scheduler already running");
            return false;
        }
        let last = self.clock.now();
        let pending = Some(self.requester.request_frame());
        self.state = State::Running { last, pending };
        tracing::info!("frame scheduler started");
        true
    }

    /// Running → Idle. Cancels the outstanding request synchronously.
    /// Returns false if already idle.
    pub fn stop(&mut self) -> bool {
        match std::mem::replace(&mut self.state, State::Idle) {
            State::Running { pending, .. } => {
                if let Some(token) = pending {
                    self.requester.cancel_frame(token);
                }
                tracing::info!(frames = self.stats.frames, "frame scheduler stopped");
                true
            }
            State::Idle => false,
        }
    }

    /// Deliver a frame callback. Runs one tick if `token` is the outstanding
    /// request, then requests the next frame.
    pub fn on_frame<H: FrameHandler>(&mut self, token: FrameToken, handler: &mut H) -> FrameOutcome {
        let State::Running { last, pending } = &mut self.state else {
            tracing::debug!(?token, "frame callback while idle ignored");
            return FrameOutcome::Ignored;
        };
        if *pending != Some(token) {
            tracing::debug!(?token, "stale frame callback ignored");
            return FrameOutcome::Ignored;
        }
        *pending = None;

        let now = self.clock.now();
        // A clock that went backwards yields zero elapsed time.
        let elapsed = now.saturating_duration_since(*last).as_secs_f32();
        *last = now;

        let outcome = match handler.run_frame(elapsed) {
            Ok(path) => {
                self.stats.frames += 1;
                match path {
                    RenderPath::Primary => self.stats.primary_frames += 1,
                    RenderPath::Fallback => self.stats.fallback_frames += 1,
                }
                FrameOutcome::Rendered(path)
            }
            Err(e) => {
                self.stats.faults += 1;
                tracing::error!("frame skipped: {e}");
                FrameOutcome::Faulted
            }
        };
        self.stats.last_elapsed = elapsed;

        if let State::Running { pending, .. } = &mut self.state {
            *pending = Some(self.requester.request_frame());
        }
        outcome
    }
}

impl<R: FrameRequester, C: Clock> Drop for FrameScheduler<R, C> {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manual::{ManualClock, ManualFrames};
    use vantage_render::RenderError;

    #[derive(Default)]
    struct Recorder {
        elapsed: Vec<f32>,
        fail: bool,
    }

    impl FrameHandler for Recorder {
        fn run_frame(&mut self, elapsed_seconds: f32) -> Result<RenderPath, FrameError> {
            self.elapsed.push(elapsed_seconds);
            if self.fail {
                return Err(FrameError::Submit(RenderError::Draw("boom".into())));
            }
            Ok(RenderPath::Fallback)
        }
    }

    fn scheduler() -> (FrameScheduler<ManualFrames, ManualClock>, ManualFrames, ManualClock) {
        let frames = ManualFrames::new();
        let clock = ManualClock::new();
        (
            FrameScheduler::with_clock(frames.clone(), clock.clone()),
            frames,
            clock,
        )
    }

    #[test]
    fn starts_idle() {
        let (sched, frames, _) = scheduler();
        assert!(!sched.is_running());
        assert_eq!(frames.requested(), 0);
    }

    #[test]
    fn start_requests_first_frame() {
        let (mut sched, frames, _) = scheduler();
        assert!(sched.start());
        assert!(sched.is_running());
        assert_eq!(frames.requested(), 1);
        assert_eq!(sched.pending(), frames.peek());
    }

    #[test]
    fn double_start_is_rejected() {
        let (mut sched, frames, _) = scheduler();
        sched.start();
        assert!(!sched.start());
        assert_eq!(frames.requested(), 1);
    }

    #[test]
    fn each_frame_requests_the_next() {
        let (mut sched, frames, clock) = scheduler();
        let mut handler = Recorder::default();
        sched.start();
        for _ in 0..3 {
            clock.advance_secs(0.5);
            let token = frames.take_next().unwrap();
            assert_eq!(
                sched.on_frame(token, &mut handler),
                FrameOutcome::Rendered(RenderPath::Fallback)
            );
        }
        assert_eq!(frames.requested(), 4);
        assert_eq!(handler.elapsed.len(), 3);
        assert!(handler.elapsed.iter().all(|e| (e - 0.5).abs() < 1e-6));
        assert_eq!(sched.stats().frames, 3);
        assert_eq!(sched.stats().fallback_frames, 3);
    }

    #[test]
    fn backward_clock_gives_zero_elapsed() {
        let (mut sched, frames, clock) = scheduler();
        let mut handler = Recorder::default();
        sched.start();
        clock.rewind_secs(2.0);
        sched.on_frame(frames.take_next().unwrap(), &mut handler);
        assert_eq!(handler.elapsed, vec![0.0]);

        clock.advance_secs(0.25);
        sched.on_frame(frames.take_next().unwrap(), &mut handler);
        assert!((handler.elapsed[1] - 0.25).abs() < 1e-6);
    }

    #[test]
    fn stop_cancels_outstanding_request() {
        let (mut sched, frames, _) = scheduler();
        let mut handler = Recorder::default();
        sched.start();
        let token = frames.peek().unwrap();
        assert!(sched.stop());
        assert_eq!(frames.cancelled(), vec![token]);
        assert_eq!(frames.pending_count(), 0);

        // The host delivers it anyway.
        assert_eq!(sched.on_frame(token, &mut handler), FrameOutcome::Ignored);
        assert!(handler.elapsed.is_empty());
        assert_eq!(frames.requested(), 1);
    }

    #[test]
    fn stale_tokens_are_ignored() {
        let (mut sched, frames, _) = scheduler();
        let mut handler = Recorder::default();
        sched.start();
        let first = frames.take_next().unwrap();
        sched.on_frame(first, &mut handler);
        assert_eq!(sched.on_frame(first, &mut handler), FrameOutcome::Ignored);
        assert_eq!(sched.on_frame(FrameToken(999), &mut handler), FrameOutcome::Ignored);
        assert_eq!(handler.elapsed.len(), 1);
    }

    #[test]
    fn restart_ignores_tokens_from_previous_run() {
        let (mut sched, frames, clock) = scheduler();
        let mut handler = Recorder::default();
        sched.start();
        let old = frames.peek().unwrap();
        sched.stop();
        clock.advance_secs(10.0);
        sched.start();

        assert_eq!(sched.on_frame(old, &mut handler), FrameOutcome::Ignored);
        clock.advance_secs(0.1);
        let fresh = frames.take_next().unwrap();
        sched.on_frame(fresh, &mut handler);
        // The frame clock restarted; the idle gap is not counted.
        assert!((handler.elapsed[0] - 0.1).abs() < 1e-6);
    }

    #[test]
    fn faults_are_counted_and_the_loop_continues() {
        let (mut sched, frames, _) = scheduler();
        let mut handler = Recorder {
            fail: true,
            ..Recorder::default()
        };
        sched.start();
        let token = frames.take_next().unwrap();
        assert_eq!(sched.on_frame(token, &mut handler), FrameOutcome::Faulted);
        assert_eq!(sched.stats().faults, 1);
        assert!(sched.is_running());
        assert!(frames.peek().is_some());

        handler.fail = false;
        let token = frames.take_next().unwrap();
        assert!(matches!(sched.on_frame(token, &mut handler), FrameOutcome::Rendered(_)));
    }

    #[test]
    fn drop_cancels_outstanding_request() {
        let (mut sched, frames, _) = scheduler();
        sched.start();
        drop(sched);
        assert_eq!(frames.cancelled().len(), 1);
        assert_eq!(frames.pending_count(), 0);
    }
}
