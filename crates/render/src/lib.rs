//! Rendering Adapter: the backend capability the viewer core drives.
//!
//! # Invariants
//! - A camera is only constructible from a [`Perspective`], so projection
//!   parameters are always set before any matrix is queried.
//! - Renderers never see input; they only receive transforms.
//!
//! # Workaround
//! Ships a headless backend that records draw calls instead of producing
//! pixels. It stands in for a GPU backend in tests and in the CLI; the
//! traits are the same ones the wgpu backend implements.

mod backend;
mod camera;
mod error;
pub mod headless;

pub use backend::{Backend, BasicRenderer, Camera, DrawSurface, MAX_LIGHTS, MeshRenderer};
pub use camera::FreeCamera;
pub use error::RenderError;
pub use headless::{DrawCall, DrawLog, HeadlessBackend, HeadlessOptions};
pub use vantage_common::Perspective;

pub fn crate_info() -> &'static str {
    "vantage-render v0.1.0"
}
