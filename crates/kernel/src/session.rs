use crate::controller::CameraController;
use crate::error::FrameError;
use crate::scene::LightRig;
use crate::scheduler::FrameHandler;
use crate::selector::{RenderPath, RendererSelector};
use vantage_common::Perspective;
use vantage_input::InputState;
use vantage_render::{Backend, Camera, DrawSurface};

/// Everything that exists once the backend is ready.
///
/// Built by [`crate::LifecycleManager::initialize`] and owned by the viewer
/// from then on.
pub struct Session<B: Backend> {
    backend: B,
    camera: B::Camera,
    selector: RendererSelector<B::Primary, B::Fallback>,
    surface: B::Surface,
    lights: LightRig,
}

impl<B: Backend> Session<B> {
    pub(crate) fn new(
        backend: B,
        camera: B::Camera,
        selector: RendererSelector<B::Primary, B::Fallback>,
        surface: B::Surface,
    ) -> Self {
        Self {
            backend,
            camera,
            selector,
            surface,
            lights: LightRig::new(),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn camera(&self) -> &B::Camera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut B::Camera {
        &mut self.camera
    }

    pub fn selector(&self) -> &RendererSelector<B::Primary, B::Fallback> {
        &self.selector
    }

    pub fn surface(&self) -> &B::Surface {
        &self.surface
    }

    pub fn lights(&self) -> &LightRig {
        &self.lights
    }

    /// Resize the drawing surface and keep the camera aspect in step.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.surface.resize(width, height);
        // Minimized windows report 0x0; keep the last usable aspect.
        if width == 0 || height == 0 {
            tracing::debug!(width, height, "zero-sized surface, camera aspect kept");
            return;
        }
        let perspective = self
            .camera
            .perspective()
            .with_aspect(Perspective::aspect_for(width, height));
        self.camera.set_perspective(perspective);
        tracing::debug!(width, height, "surface resized");
    }

    /// One tick: controller, lights, then exactly one draw. The input's
    /// per-frame edges are cleared whatever the outcome.
    pub fn run_frame(
        &mut self,
        elapsed_seconds: f32,
        controller: &CameraController,
        input: &mut InputState,
    ) -> Result<RenderPath, FrameError> {
        let result = self.tick(elapsed_seconds, controller, input);
        input.end_frame();
        result
    }

    fn tick(
        &mut self,
        elapsed_seconds: f32,
        controller: &CameraController,
        input: &mut InputState,
    ) -> Result<RenderPath, FrameError> {
        controller.tick(elapsed_seconds, input, Some(&mut self.camera));

        self.lights.advance(elapsed_seconds);
        if let Some(primary) = self.selector.primary_mut() {
            self.lights.apply(primary).map_err(FrameError::SceneUpdate)?;
        }

        self.selector
            .submit_frame(&self.camera)
            .map_err(FrameError::Submit)
    }
}

/// Borrows a session and the per-frame inputs for one scheduler callback.
pub(crate) struct FrameContext<'a, B: Backend> {
    pub session: &'a mut Session<B>,
    pub controller: &'a CameraController,
    pub input: &'a mut InputState,
}

impl<B: Backend> FrameHandler for FrameContext<'_, B> {
    fn run_frame(&mut self, elapsed_seconds: f32) -> Result<RenderPath, FrameError> {
        self.session
            .run_frame(elapsed_seconds, self.controller, self.input)
    }
}
