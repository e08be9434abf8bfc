//! Headless backend: records draw calls instead of producing pixels.
//!
//! All handles share one [`DrawLog`], so a test can keep a clone and inspect
//! every submission after the renderers have been moved into a session.

use crate::backend::{Backend, BasicRenderer, DrawSurface, MAX_LIGHTS, MeshRenderer};
use crate::camera::FreeCamera;
use crate::error::RenderError;
use glam::{Mat4, Vec3};
use std::cell::{Cell, RefCell};
use std::fmt::Write as _;
use std::rc::Rc;
use vantage_common::{Light, MeshInstance, Perspective};

/// One recorded submission.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCall {
    Mesh {
        view: Mat4,
        projection: Mat4,
        eye: Vec3,
        instances: usize,
        lights: [Light; MAX_LIGHTS],
    },
    Basic {
        model: Mat4,
        view: Mat4,
        projection: Mat4,
    },
}

impl DrawCall {
    pub fn is_mesh(&self) -> bool {
        matches!(self, DrawCall::Mesh { .. })
    }

    /// Human-readable one-line summary.
    pub fn describe(&self) -> String {
        let mut out = String::new();
        match self {
            DrawCall::Mesh {
                eye,
                instances,
                lights,
                ..
            } => {
                let _ = write!(
                    out,
                    "mesh: eye=({:.2}, {:.2}, {:.2}) instances={}",
                    eye.x, eye.y, eye.z, instances
                );
                for (i, light) in lights.iter().enumerate() {
                    let p = light.position;
                    let _ = write!(out, " L{i}=({:.1}, {:.1}, {:.1})", p.x, p.y, p.z);
                }
            }
            DrawCall::Basic { model, view, .. } => {
                let eye = view.inverse().transform_point3(Vec3::ZERO);
                let _ = write!(
                    out,
                    "basic: eye=({:.2}, {:.2}, {:.2}) identity_model={}",
                    eye.x,
                    eye.y,
                    eye.z,
                    *model == Mat4::IDENTITY
                );
            }
        }
        out
    }
}

/// Shared record of draw calls plus a draw-fault injector.
#[derive(Debug, Clone, Default)]
pub struct DrawLog {
    calls: Rc<RefCell<Vec<DrawCall>>>,
    failures_pending: Rc<Cell<u32>>,
}

impl DrawLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<DrawCall> {
        self.calls.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.calls.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.calls.borrow().is_empty()
    }

    pub fn last(&self) -> Option<DrawCall> {
        self.calls.borrow().last().cloned()
    }

    pub fn mesh_draws(&self) -> usize {
        self.calls.borrow().iter().filter(|c| c.is_mesh()).count()
    }

    pub fn basic_draws(&self) -> usize {
        self.calls.borrow().iter().filter(|c| !c.is_mesh()).count()
    }

    pub fn clear(&self) {
        self.calls.borrow_mut().clear();
    }

    /// Make the next `count` draws fail with [`RenderError::Draw`].
    pub fn fail_next(&self, count: u32) {
        self.failures_pending.set(count);
    }

    fn record(&self, call: DrawCall) -> Result<(), RenderError> {
        let pending = self.failures_pending.get();
        if pending > 0 {
            self.failures_pending.set(pending - 1);
            return Err(RenderError::Draw("injected draw failure".into()));
        }
        self.calls.borrow_mut().push(call);
        Ok(())
    }
}

/// Knobs for the headless backend.
#[derive(Debug, Clone)]
pub struct HeadlessOptions {
    /// Shader names `load_shaders` accepts.
    pub shaders: Vec<String>,
    /// Mesh names `set_mesh` accepts.
    pub meshes: Vec<String>,
    pub fail_primary: bool,
    pub fail_surface_bind: bool,
}

impl Default for HeadlessOptions {
    fn default() -> Self {
        Self {
            shaders: vec!["pbr.vert".into(), "pbr.frag".into()],
            meshes: vec!["cube".into()],
            fail_primary: false,
            fail_surface_bind: false,
        }
    }
}

/// Backend that records into a [`DrawLog`].
#[derive(Debug, Clone)]
pub struct HeadlessBackend {
    options: HeadlessOptions,
    log: DrawLog,
}

impl HeadlessBackend {
    pub fn new(options: HeadlessOptions, log: DrawLog) -> Self {
        Self { options, log }
    }

    /// Readiness future that resolves immediately.
    pub async fn connect(options: HeadlessOptions, log: DrawLog) -> Result<Self, RenderError> {
        tracing::debug!("headless backend connecting");
        Ok(Self::new(options, log))
    }

    /// Readiness future that resolves to an error.
    pub async fn unavailable(reason: &str) -> Result<Self, RenderError> {
        Err(RenderError::BackendUnavailable(reason.to_string()))
    }

    pub fn log(&self) -> &DrawLog {
        &self.log
    }
}

impl Backend for HeadlessBackend {
    type Camera = FreeCamera;
    type Primary = HeadlessMeshRenderer;
    type Fallback = HeadlessBasicRenderer;
    type Surface = HeadlessSurface;

    fn name(&self) -> &str {
        "headless"
    }

    fn create_camera(&mut self, perspective: Perspective) -> FreeCamera {
        FreeCamera::new(perspective)
    }

    fn create_primary(&mut self) -> Result<HeadlessMeshRenderer, RenderError> {
        if self.options.fail_primary {
            return Err(RenderError::NotReady("mesh renderer construction disabled"));
        }
        Ok(HeadlessMeshRenderer {
            known_shaders: self.options.shaders.clone(),
            known_meshes: self.options.meshes.clone(),
            shaders_loaded: false,
            mesh: None,
            instances: Vec::new(),
            lights: [Light::default(); MAX_LIGHTS],
            log: self.log.clone(),
        })
    }

    fn create_fallback(&mut self) -> HeadlessBasicRenderer {
        HeadlessBasicRenderer {
            model: Mat4::IDENTITY,
            view: Mat4::IDENTITY,
            projection: Mat4::IDENTITY,
            log: self.log.clone(),
        }
    }

    fn create_surface(&mut self, width: u32, height: u32) -> HeadlessSurface {
        HeadlessSurface {
            width,
            height,
            target: None,
            fail_bind: self.options.fail_surface_bind,
        }
    }
}

#[derive(Debug)]
pub struct HeadlessMeshRenderer {
    known_shaders: Vec<String>,
    known_meshes: Vec<String>,
    shaders_loaded: bool,
    mesh: Option<String>,
    instances: Vec<MeshInstance>,
    lights: [Light; MAX_LIGHTS],
    log: DrawLog,
}

impl HeadlessMeshRenderer {
    pub fn instances(&self) -> &[MeshInstance] {
        &self.instances
    }

    pub fn lights(&self) -> &[Light; MAX_LIGHTS] {
        &self.lights
    }
}

impl MeshRenderer for HeadlessMeshRenderer {
    fn load_shaders(&mut self, vertex: &str, fragment: &str) -> Result<(), RenderError> {
        let known = |name: &str| self.known_shaders.iter().any(|s| s == name);
        if let Some(missing) = [vertex, fragment].into_iter().find(|n| !known(*n)) {
            return Err(RenderError::ShaderLoad {
                vertex: vertex.to_string(),
                fragment: fragment.to_string(),
                reason: format!("no shader named {missing:?}"),
            });
        }
        self.shaders_loaded = true;
        Ok(())
    }

    fn set_mesh(&mut self, mesh: &str) -> Result<(), RenderError> {
        if !self.known_meshes.iter().any(|m| m == mesh) {
            return Err(RenderError::MeshLoad {
                name: mesh.to_string(),
                reason: "unknown mesh".into(),
            });
        }
        self.mesh = Some(mesh.to_string());
        Ok(())
    }

    fn add_instance(&mut self, instance: MeshInstance) {
        self.instances.push(instance);
    }

    fn clear_instances(&mut self) {
        self.instances.clear();
    }

    fn set_light(&mut self, index: usize, light: Light) -> Result<(), RenderError> {
        let slot = self.lights.get_mut(index).ok_or(RenderError::LightIndex {
            index,
            max: MAX_LIGHTS,
        })?;
        *slot = light;
        Ok(())
    }

    fn is_ready(&self) -> bool {
        self.shaders_loaded && self.mesh.is_some() && !self.instances.is_empty()
    }

    fn render(&mut self, view: Mat4, projection: Mat4, eye: Vec3) -> Result<(), RenderError> {
        if !self.is_ready() {
            return Err(RenderError::NotReady("mesh content not loaded"));
        }
        self.log.record(DrawCall::Mesh {
            view,
            projection,
            eye,
            instances: self.instances.len(),
            lights: self.lights,
        })
    }
}

#[derive(Debug)]
pub struct HeadlessBasicRenderer {
    model: Mat4,
    view: Mat4,
    projection: Mat4,
    log: DrawLog,
}

impl BasicRenderer for HeadlessBasicRenderer {
    fn set_model_matrix(&mut self, model: Mat4) {
        self.model = model;
    }

    fn set_view_matrix(&mut self, view: Mat4) {
        self.view = view;
    }

    fn set_projection_matrix(&mut self, projection: Mat4) {
        self.projection = projection;
    }

    fn render(&mut self) -> Result<(), RenderError> {
        self.log.record(DrawCall::Basic {
            model: self.model,
            view: self.view,
            projection: self.projection,
        })
    }
}

#[derive(Debug)]
pub struct HeadlessSurface {
    width: u32,
    height: u32,
    target: Option<String>,
    fail_bind: bool,
}

impl HeadlessSurface {
    pub fn target(&self) -> Option<&str> {
        self.target.as_deref()
    }
}

impl DrawSurface for HeadlessSurface {
    fn init(&mut self, target: &str) -> Result<(), RenderError> {
        if let Some(bound) = &self.target {
            tracing::debug!("surface already bound to {bound:?}");
            return Ok(());
        }
        if self.fail_bind || target.is_empty() {
            return Err(RenderError::SurfaceBind {
                target: target.to_string(),
                reason: "no such output".into(),
            });
        }
        self.target = Some(target.to_string());
        Ok(())
    }

    fn is_initialized(&self) -> bool {
        self.target.is_some()
    }

    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
    }
}
