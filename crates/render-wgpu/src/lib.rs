//! wgpu render backend for the viewer.
//!
//! The mesh renderer draws instanced, lit meshes; the fallback draws an
//! unlit floor grid and needs nothing loaded.
//!
//! # Invariants
//! - Both renderers share one device and swapchain through [`GpuContext`].
//! - A stale swapchain is reconfigured and the frame skipped, never faulted.

mod backend;
mod context;
pub mod geometry;
pub mod layout;
mod lines;
mod mesh;
pub mod shaders;

pub use backend::{WgpuBackend, WgpuSurface};
pub use context::GpuContext;
pub use lines::WgpuLineRenderer;
pub use mesh::WgpuMeshRenderer;
