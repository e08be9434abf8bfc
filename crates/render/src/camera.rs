use crate::backend::Camera;
use glam::{EulerRot, Mat4, Quat, Vec3};
use vantage_common::Perspective;

/// Free camera with position, yaw/pitch/roll, scale, and a perspective
/// projection.
///
/// Yaw turns about world up, pitch about the camera's local right. Pitch is
/// not clamped: rotating past ±90° flips the view upside down.
#[derive(Debug, Clone, PartialEq)]
pub struct FreeCamera {
    position: Vec3,
    yaw: f32,
    pitch: f32,
    roll: f32,
    scale: Vec3,
    perspective: Perspective,
}

impl FreeCamera {
    pub fn new(perspective: Perspective) -> Self {
        Self {
            position: Vec3::ZERO,
            yaw: 0.0,
            pitch: 0.0,
            roll: 0.0,
            scale: Vec3::ONE,
            perspective,
        }
    }

    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    pub fn rotation(&self) -> Quat {
        Quat::from_euler(EulerRot::YXZ, self.yaw, self.pitch, self.roll)
    }

    pub fn forward(&self) -> Vec3 {
        (self.rotation() * Vec3::NEG_Z).normalize()
    }

    pub fn right(&self) -> Vec3 {
        (self.rotation() * Vec3::X).normalize()
    }

    pub fn up(&self) -> Vec3 {
        (self.rotation() * Vec3::Y).normalize()
    }

    /// Camera-to-world transform.
    pub fn transform_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation(), self.position)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }
}

impl Camera for FreeCamera {
    fn set_perspective(&mut self, perspective: Perspective) {
        self.perspective = perspective;
    }

    fn perspective(&self) -> Perspective {
        self.perspective
    }

    fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    fn set_rotation(&mut self, euler: Vec3) {
        self.pitch = euler.x;
        self.yaw = euler.y;
        self.roll = euler.z;
    }

    fn set_scale(&mut self, scale: Vec3) {
        self.scale = scale;
    }

    fn move_forward(&mut self, distance: f32) {
        self.position += self.forward() * distance;
    }

    fn move_right(&mut self, distance: f32) {
        self.position += self.right() * distance;
    }

    fn move_up(&mut self, distance: f32) {
        self.position += self.up() * distance;
    }

    fn rotate_yaw(&mut self, radians: f32) {
        self.yaw += radians;
    }

    fn rotate_pitch(&mut self, radians: f32) {
        self.pitch += radians;
    }

    fn view_matrix(&self) -> Mat4 {
        self.transform_matrix().inverse()
    }

    fn projection_matrix(&self) -> Mat4 {
        let p = self.perspective;
        Mat4::perspective_rh(p.fov_degrees.to_radians(), p.aspect, p.near, p.far)
    }

    fn position(&self) -> Vec3 {
        self.position
    }
}
