//! Viewer Kernel: camera control, renderer selection, frame scheduling, and
//! backend lifecycle.
//!
//! # Invariants
//! - All per-frame state lives in an explicit [`Session`]; nothing global.
//! - The loop only starts after the drawing surface is bound.
//! - After [`FrameScheduler::stop`], no frame callback mutates the camera or
//!   reaches a renderer.
//! - Exactly one draw submission per frame.
//! - Everything runs on one cooperative execution context; no locks.

pub mod controller;
pub mod error;
pub mod lifecycle;
pub mod manual;
pub mod scene;
pub mod scheduler;
pub mod selector;
pub mod session;
pub mod viewer;

pub use controller::CameraController;
pub use error::{FrameError, InitError};
pub use lifecycle::{LifecycleManager, LifecycleState};
pub use manual::{ManualClock, ManualFrames};
pub use scene::{LightRig, default_instances};
pub use scheduler::{
    Clock, FrameHandler, FrameOutcome, FrameRequester, FrameScheduler, FrameStats, FrameToken,
    SystemClock,
};
pub use selector::{RenderPath, RendererSelector};
pub use session::Session;
pub use viewer::Viewer;

pub fn crate_info() -> &'static str {
    "vantage-kernel v0.1.0"
}
