/// Errors raised by backend operations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RenderError {
    #[error("backend unavailable: {0}")]
    BackendUnavailable(String),
    #[error("failed to load shaders {vertex} / {fragment}: {reason}")]
    ShaderLoad {
        vertex: String,
        fragment: String,
        reason: String,
    },
    #[error("failed to load mesh {name}: {reason}")]
    MeshLoad { name: String, reason: String },
    #[error("light index {index} out of range (max {max})")]
    LightIndex { index: usize, max: usize },
    #[error("failed to bind surface to {target:?}: {reason}")]
    SurfaceBind { target: String, reason: String },
    #[error("surface not initialized")]
    SurfaceNotInitialized,
    #[error("renderer not ready: {0}")]
    NotReady(&'static str),
    #[error("draw failed: {0}")]
    Draw(String),
}
