use crate::error::RenderError;
use glam::{Mat4, Vec3};
use vantage_common::{Light, MeshInstance, Perspective};

/// Number of light slots a mesh renderer exposes.
pub const MAX_LIGHTS: usize = 4;

/// Camera operations the core relies on.
///
/// Rotation angles are radians. Movement distances are world units along
/// the camera's local axes.
pub trait Camera {
    fn set_perspective(&mut self, perspective: Perspective);
    fn perspective(&self) -> Perspective;

    fn set_position(&mut self, position: Vec3);
    /// Euler angles: x = pitch, y = yaw, z = roll.
    fn set_rotation(&mut self, euler: Vec3);
    fn set_scale(&mut self, scale: Vec3);

    fn move_forward(&mut self, distance: f32);
    fn move_right(&mut self, distance: f32);
    fn move_up(&mut self, distance: f32);

    fn rotate_yaw(&mut self, radians: f32);
    fn rotate_pitch(&mut self, radians: f32);

    fn view_matrix(&self) -> Mat4;
    fn projection_matrix(&self) -> Mat4;
    fn position(&self) -> Vec3;
}

/// Mesh-capable renderer. Only usable once shaders and mesh content load.
pub trait MeshRenderer {
    fn load_shaders(&mut self, vertex: &str, fragment: &str) -> Result<(), RenderError>;
    fn set_mesh(&mut self, mesh: &str) -> Result<(), RenderError>;
    fn add_instance(&mut self, instance: MeshInstance);
    fn clear_instances(&mut self);
    fn set_light(&mut self, index: usize, light: Light) -> Result<(), RenderError>;

    /// Shaders compiled, mesh set, and at least one instance present.
    fn is_ready(&self) -> bool;

    fn render(&mut self, view: Mat4, projection: Mat4, eye: Vec3) -> Result<(), RenderError>;
}

/// Minimal renderer with no content requirements.
pub trait BasicRenderer {
    fn set_model_matrix(&mut self, model: Mat4);
    fn set_view_matrix(&mut self, view: Mat4);
    fn set_projection_matrix(&mut self, projection: Mat4);
    fn render(&mut self) -> Result<(), RenderError>;
}

/// The output target a backend renders into.
pub trait DrawSurface {
    /// Bind to the output named by `target`. Binding an already bound
    /// surface is a no-op.
    fn init(&mut self, target: &str) -> Result<(), RenderError>;
    fn is_initialized(&self) -> bool;
    fn width(&self) -> u32;
    fn height(&self) -> u32;
    fn resize(&mut self, width: u32, height: u32);
}

/// A ready rendering engine. Obtained from an asynchronous readiness
/// future; every entity is constructed through it.
pub trait Backend {
    type Camera: Camera;
    type Primary: MeshRenderer;
    type Fallback: BasicRenderer;
    type Surface: DrawSurface;

    fn name(&self) -> &str;

    fn create_camera(&mut self, perspective: Perspective) -> Self::Camera;
    fn create_primary(&mut self) -> Result<Self::Primary, RenderError>;
    fn create_fallback(&mut self) -> Self::Fallback;
    fn create_surface(&mut self, width: u32, height: u32) -> Self::Surface;
}
