use glam::Mat4;
use vantage_render::{BasicRenderer, Camera, MeshRenderer, RenderError};

/// Which renderer received a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RenderPath {
    Primary,
    Fallback,
}

/// Routes each frame to the mesh renderer when its content is loaded and to
/// the basic renderer otherwise.
///
/// The choice is made per frame, never cached, so a mesh renderer that never
/// finishes loading cannot block rendering.
#[derive(Debug)]
pub struct RendererSelector<P, F> {
    primary: Option<P>,
    fallback: F,
    last_path: Option<RenderPath>,
}

impl<P: MeshRenderer, F: BasicRenderer> RendererSelector<P, F> {
    pub fn new(primary: Option<P>, fallback: F) -> Self {
        Self {
            primary,
            fallback,
            last_path: None,
        }
    }

    /// True if the next frame would go to the mesh renderer.
    pub fn primary_available(&self) -> bool {
        self.primary.as_ref().is_some_and(|p| p.is_ready())
    }

    pub fn primary(&self) -> Option<&P> {
        self.primary.as_ref()
    }

    pub fn primary_mut(&mut self) -> Option<&mut P> {
        self.primary.as_mut()
    }

    pub fn fallback(&self) -> &F {
        &self.fallback
    }

    pub fn last_path(&self) -> Option<RenderPath> {
        self.last_path
    }

    /// Push the camera's transforms to exactly one renderer and draw.
    pub fn submit_frame<C: Camera>(&mut self, camera: &C) -> Result<RenderPath, RenderError> {
        let view = camera.view_matrix();
        let projection = camera.projection_matrix();

        let path = if self.primary_available() {
            RenderPath::Primary
        } else {
            RenderPath::Fallback
        };
        self.note_path(path);

        match self.primary.as_mut() {
            Some(primary) if path == RenderPath::Primary => {
                primary.render(view, projection, camera.position())?;
            }
            _ => {
                self.fallback.set_model_matrix(Mat4::IDENTITY);
                self.fallback.set_view_matrix(view);
                self.fallback.set_projection_matrix(projection);
                self.fallback.render()?;
            }
        }
        Ok(path)
    }

    fn note_path(&mut self, path: RenderPath) {
        if self.last_path != Some(path) {
            match path {
                RenderPath::Primary => tracing::info!("rendering with mesh renderer"),
                RenderPath::Fallback => tracing::info!("rendering with fallback renderer"),
            }
            self.last_path = Some(path);
        }
    }
}
