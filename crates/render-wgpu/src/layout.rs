//! GPU-side layouts for uniforms and per-instance data. Field order and
//! padding mirror the WGSL structs in [`crate::shaders`].

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};
use vantage_common::{Light, MeshInstance};
use vantage_render::MAX_LIGHTS;

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct GpuLight {
    /// xyz position, w range.
    pub position_range: [f32; 4],
    /// rgb color, w intensity.
    pub color_intensity: [f32; 4],
}

impl From<&Light> for GpuLight {
    fn from(light: &Light) -> Self {
        Self {
            position_range: light.position.extend(light.range).to_array(),
            color_intensity: light.color.extend(light.intensity).to_array(),
        }
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct MeshUniforms {
    pub view_proj: [[f32; 4]; 4],
    pub eye: [f32; 4],
    pub lights: [GpuLight; MAX_LIGHTS],
}

impl MeshUniforms {
    pub fn new(view: Mat4, projection: Mat4, eye: Vec3, lights: &[Light; MAX_LIGHTS]) -> Self {
        Self {
            view_proj: (projection * view).to_cols_array_2d(),
            eye: eye.extend(1.0).to_array(),
            lights: lights.each_ref().map(GpuLight::from),
        }
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct LineUniforms {
    pub mvp: [[f32; 4]; 4],
}

impl LineUniforms {
    pub fn new(model: Mat4, view: Mat4, projection: Mat4) -> Self {
        Self {
            mvp: (projection * view * model).to_cols_array_2d(),
        }
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct InstanceData {
    pub model: [[f32; 4]; 4],
    /// rgb albedo, w metallic.
    pub albedo_metallic: [f32; 4],
    /// x roughness, y ambient occlusion.
    pub roughness_ao: [f32; 4],
}

impl From<&MeshInstance> for InstanceData {
    fn from(instance: &MeshInstance) -> Self {
        let m = &instance.material;
        Self {
            model: instance.transform.to_cols_array_2d(),
            albedo_metallic: m.albedo.extend(m.metallic).to_array(),
            roughness_ao: [m.roughness, m.ao, 0.0, 0.0],
        }
    }
}
