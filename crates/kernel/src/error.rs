use vantage_render::RenderError;

/// Fatal failures while bringing the backend up. Reported once; never retried.
#[derive(Debug, thiserror::Error)]
pub enum InitError {
    #[error("backend never became ready: {0}")]
    BackendUnavailable(#[source] RenderError),
    #[error("drawing surface bind failed: {0}")]
    SurfaceBind(#[source] RenderError),
    #[error("initialization already attempted")]
    AlreadyInitialized,
}

/// A failure inside one frame. The scheduler logs it and keeps the loop alive.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    #[error("scene update failed: {0}")]
    SceneUpdate(#[source] RenderError),
    #[error("draw submission failed: {0}")]
    Submit(#[source] RenderError),
}
