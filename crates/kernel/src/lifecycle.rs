use crate::error::InitError;
use crate::scene::default_instances;
use crate::selector::RendererSelector;
use crate::session::Session;
use std::future::Future;
use vantage_common::{Perspective, ViewerConfig};
use vantage_render::{Backend, Camera, DrawSurface, MeshRenderer, RenderError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    /// `initialize` not called yet.
    Pending,
    /// Waiting on the readiness future.
    AwaitingBackend,
    Ready,
    /// Initialization failed; never retried.
    Failed,
}

/// Brings a backend from "requested" to a fully wired [`Session`].
///
/// Runs at most once. Content failures on the mesh renderer only degrade
/// rendering to the fallback; a missing backend or an unbindable surface
/// fails the whole initialization.
#[derive(Debug)]
pub struct LifecycleManager {
    config: ViewerConfig,
    state: LifecycleState,
}

impl LifecycleManager {
    pub fn new(config: ViewerConfig) -> Self {
        Self {
            config,
            state: LifecycleState::Pending,
        }
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    pub async fn initialize<B, F>(&mut self, ready: F) -> Result<Session<B>, InitError>
    where
        B: Backend,
        F: Future<Output = Result<B, RenderError>>,
    {
        if self.state != LifecycleState::Pending {
            tracing::warn!(state = ?self.state, "initialize called twice");
            return Err(InitError::AlreadyInitialized);
        }

        self.state = LifecycleState::AwaitingBackend;
        let mut backend = match ready.await {
            Ok(backend) => backend,
            Err(e) => {
                self.state = LifecycleState::Failed;
                tracing::error!("backend unavailable: {e}");
                return Err(InitError::BackendUnavailable(e));
            }
        };
        tracing::info!(backend = backend.name(), "backend ready");

        let config = &self.config;
        let mut camera = backend.create_camera(config.perspective(config.surface_width, config.surface_height));
        camera.set_position(config.initial_position);

        let fallback = backend.create_fallback();
        let primary = match backend.create_primary() {
            Ok(mut primary) => {
                if let Err(e) = load_content(&mut primary, config) {
                    tracing::warn!("mesh content unavailable, using fallback renderer: {e}");
                }
                Some(primary)
            }
            Err(e) => {
                tracing::warn!("mesh renderer unavailable, using fallback renderer: {e}");
                None
            }
        };

        let mut surface = backend.create_surface(config.surface_width, config.surface_height);
        if let Err(e) = surface.init(&config.surface_target) {
            self.state = LifecycleState::Failed;
            tracing::error!(surface = %config.surface_target, "surface bind failed: {e}");
            return Err(InitError::SurfaceBind(e));
        }

        let aspect = Perspective::aspect_for(surface.width(), surface.height());
        camera.set_perspective(camera.perspective().with_aspect(aspect));
        tracing::info!(
            width = surface.width(),
            height = surface.height(),
            surface = %config.surface_target,
            "surface bound"
        );

        self.state = LifecycleState::Ready;
        Ok(Session::new(
            backend,
            camera,
            RendererSelector::new(primary, fallback),
            surface,
        ))
    }
}

/// Shaders, mesh, the default instances, and a first set of lights.
fn load_content<R: MeshRenderer>(primary: &mut R, config: &ViewerConfig) -> Result<(), RenderError> {
    primary.load_shaders(&config.vertex_shader, &config.fragment_shader)?;
    primary.set_mesh(&config.mesh)?;
    for instance in default_instances() {
        primary.add_instance(instance);
    }
    crate::scene::LightRig::new().apply(primary)
}
