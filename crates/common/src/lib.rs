//! Shared types and viewer configuration.
//!
//! # Invariants
//! - Types here carry no behavior beyond construction and defaults.
//! - Configuration always has a complete default; files only override.

pub mod config;
pub mod types;

pub use config::{ConfigError, ViewerConfig};
pub use types::{Light, LightKind, MaterialParams, MeshInstance, Perspective};
