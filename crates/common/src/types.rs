use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

/// Perspective projection parameters. Field of view is in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Perspective {
    pub fov_degrees: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Perspective {
    pub fn new(fov_degrees: f32, aspect: f32, near: f32, far: f32) -> Self {
        Self {
            fov_degrees,
            aspect,
            near,
            far,
        }
    }

    /// Aspect ratio for a surface of the given pixel size. A zero height is
    /// treated as one pixel.
    pub fn aspect_for(width: u32, height: u32) -> f32 {
        width as f32 / height.max(1) as f32
    }

    /// Same parameters with a different aspect ratio.
    pub fn with_aspect(self, aspect: f32) -> Self {
        Self { aspect, ..self }
    }
}

impl Default for Perspective {
    fn default() -> Self {
        Self {
            fov_degrees: 45.0,
            aspect: 16.0 / 9.0,
            near: 0.1,
            far: 100.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LightKind {
    Point,
    Directional,
    Spot,
}

/// A scene light as consumed by mesh-capable renderers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Light {
    pub kind: LightKind,
    pub position: Vec3,
    pub direction: Vec3,
    pub color: Vec3,
    pub intensity: f32,
    pub range: f32,
}

impl Light {
    /// A point light pointing straight down.
    pub fn point(position: Vec3, color: Vec3, intensity: f32, range: f32) -> Self {
        Self {
            kind: LightKind::Point,
            position,
            direction: Vec3::NEG_Y,
            color,
            intensity,
            range,
        }
    }
}

impl Default for Light {
    fn default() -> Self {
        Self::point(Vec3::ZERO, Vec3::ONE, 1.0, 10.0)
    }
}

/// Surface response parameters for a mesh instance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MaterialParams {
    pub albedo: Vec3,
    pub metallic: f32,
    pub roughness: f32,
    pub ao: f32,
}

impl Default for MaterialParams {
    fn default() -> Self {
        Self {
            albedo: Vec3::new(0.5, 0.0, 0.5),
            metallic: 0.0,
            roughness: 0.5,
            ao: 1.0,
        }
    }
}

/// One placement of the loaded mesh.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MeshInstance {
    pub transform: Mat4,
    pub material: MaterialParams,
}

impl MeshInstance {
    pub fn at(transform: Mat4) -> Self {
        Self {
            transform,
            material: MaterialParams::default(),
        }
    }
}

impl Default for MeshInstance {
    fn default() -> Self {
        Self::at(Mat4::IDENTITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aspect_guards_zero_height() {
        assert_eq!(Perspective::aspect_for(800, 0), 800.0);
        assert_eq!(Perspective::aspect_for(1920, 1080), 1920.0 / 1080.0);
    }

    #[test]
    fn with_aspect_keeps_other_fields() {
        let p = Perspective::default().with_aspect(2.0);
        assert_eq!(p.aspect, 2.0);
        assert_eq!(p.fov_degrees, 45.0);
        assert_eq!(p.far, 100.0);
    }

    #[test]
    fn mesh_instance_default_is_identity() {
        let m = MeshInstance::default();
        assert_eq!(m.transform, Mat4::IDENTITY);
        assert_eq!(m.material.roughness, 0.5);
    }

    #[test]
    fn point_light_faces_down() {
        let l = Light::point(Vec3::Y, Vec3::X, 2.0, 5.0);
        assert_eq!(l.kind, LightKind::Point);
        assert_eq!(l.direction, Vec3::NEG_Y);
    }
}
