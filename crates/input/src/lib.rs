//! Input: raw device state tracking and logical key bindings.
//!
//! # Invariants
//! - The tracker is pure data; it never touches the camera.
//! - Rotation deltas are edge-triggered per drag and consumed exactly once.
//! - The first move after a rotate-button press only captures a baseline.

pub mod action;
pub mod keys;
pub mod state;

pub use action::{Action, Axis, Direction, KeyBindings};
pub use keys::{KeyCode, MouseButton, UnknownKey};
pub use state::InputState;

pub fn crate_info() -> &'static str {
    "vantage-input v0.1.0"
}
