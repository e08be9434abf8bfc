use crate::context::{GpuContext, begin_pass, depth_stencil};
use crate::geometry::{Vertex, builtin_mesh};
use crate::layout::{InstanceData, MeshUniforms};
use crate::shaders;
use glam::{Mat4, Vec3};
use std::rc::Rc;
use vantage_common::{Light, MeshInstance};
use vantage_render::{MAX_LIGHTS, MeshRenderer, RenderError};
use wgpu::util::DeviceExt;

const CLEAR: wgpu::Color = wgpu::Color {
    r: 0.1,
    g: 0.1,
    b: 0.15,
    a: 1.0,
};

struct GpuMesh {
    name: String,
    vertices: wgpu::Buffer,
    indices: wgpu::Buffer,
    index_count: u32,
}

/// Instanced, lit mesh renderer. Ready once shaders, a mesh, and at least
/// one instance are loaded.
pub struct WgpuMeshRenderer {
    ctx: Rc<GpuContext>,
    bind_group_layout: wgpu::BindGroupLayout,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    pipeline: Option<wgpu::RenderPipeline>,
    mesh: Option<GpuMesh>,
    instances: Vec<MeshInstance>,
    instance_buffer: Option<(wgpu::Buffer, usize)>,
    instances_dirty: bool,
    lights: [Light; MAX_LIGHTS],
}

impl WgpuMeshRenderer {
    pub(crate) fn new(ctx: Rc<GpuContext>) -> Self {
        let device = &ctx.device;
        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("mesh_uniforms"),
            size: std::mem::size_of::<MeshUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("mesh_uniform_layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });
        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("mesh_uniform_bind_group"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        Self {
            ctx,
            bind_group_layout,
            uniform_buffer,
            uniform_bind_group,
            pipeline: None,
            mesh: None,
            instances: Vec::new(),
            instance_buffer: None,
            instances_dirty: false,
            lights: [Light::default(); MAX_LIGHTS],
        }
    }

    pub fn mesh_name(&self) -> Option<&str> {
        self.mesh.as_ref().map(|m| m.name.as_str())
    }

    pub fn instance_count(&self) -> usize {
        self.instances.len()
    }

    fn build_pipeline(&self, source: String) -> Result<wgpu::RenderPipeline, String> {
        let format = self.ctx.format();
        let layout = &self.bind_group_layout;
        self.ctx.validated(|device| {
            let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some("mesh_shader"),
                source: wgpu::ShaderSource::Wgsl(source.into()),
            });
            let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("mesh_pipeline_layout"),
                bind_group_layouts: &[layout],
                push_constant_ranges: &[],
            });
            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some("mesh_pipeline"),
                layout: Some(&pipeline_layout),
                vertex: wgpu::VertexState {
                    module: &module,
                    entry_point: Some("vs_main"),
                    compilation_options: Default::default(),
                    buffers: &[
                        wgpu::VertexBufferLayout {
                            array_stride: std::mem::size_of::<Vertex>() as u64,
                            step_mode: wgpu::VertexStepMode::Vertex,
                            attributes: &wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3],
                        },
                        wgpu::VertexBufferLayout {
                            array_stride: std::mem::size_of::<InstanceData>() as u64,
                            step_mode: wgpu::VertexStepMode::Instance,
                            attributes: &wgpu::vertex_attr_array![
                                2 => Float32x4,
                                3 => Float32x4,
                                4 => Float32x4,
                                5 => Float32x4,
                                6 => Float32x4,
                                7 => Float32x4,
                            ],
                        },
                    ],
                },
                fragment: Some(wgpu::FragmentState {
                    module: &module,
                    entry_point: Some("fs_main"),
                    compilation_options: Default::default(),
                    targets: &[Some(wgpu::ColorTargetState {
                        format,
                        blend: Some(wgpu::BlendState::REPLACE),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                }),
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    cull_mode: Some(wgpu::Face::Back),
                    ..Default::default()
                },
                depth_stencil: Some(depth_stencil()),
                multisample: Default::default(),
                multiview: None,
                cache: None,
            })
        })
    }

    /// Grow or refill the instance buffer when instances changed.
    fn upload_instances(&mut self) {
        if !self.instances_dirty || self.instances.is_empty() {
            return;
        }
        let data: Vec<InstanceData> = self.instances.iter().map(InstanceData::from).collect();
        match &self.instance_buffer {
            Some((buffer, capacity)) if *capacity >= data.len() => {
                self.ctx.queue.write_buffer(buffer, 0, bytemuck::cast_slice(&data));
            }
            _ => {
                let buffer = self.ctx.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("mesh_instances"),
                    contents: bytemuck::cast_slice(&data),
                    usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
                });
                self.instance_buffer = Some((buffer, data.len()));
            }
        }
        self.instances_dirty = false;
    }
}

impl MeshRenderer for WgpuMeshRenderer {
    fn load_shaders(&mut self, vertex: &str, fragment: &str) -> Result<(), RenderError> {
        let source = shaders::resolve(vertex, fragment)?;
        let pipeline = self.build_pipeline(source).map_err(|reason| RenderError::ShaderLoad {
            vertex: vertex.to_string(),
            fragment: fragment.to_string(),
            reason,
        })?;
        self.pipeline = Some(pipeline);
        tracing::debug!(vertex, fragment, "mesh shaders loaded");
        Ok(())
    }

    fn set_mesh(&mut self, mesh: &str) -> Result<(), RenderError> {
        let data = builtin_mesh(mesh)?;
        let device = &self.ctx.device;
        let vertices = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("mesh_vertices"),
            contents: bytemuck::cast_slice(&data.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let indices = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("mesh_indices"),
            contents: bytemuck::cast_slice(&data.indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        self.mesh = Some(GpuMesh {
            name: mesh.to_string(),
            vertices,
            indices,
            index_count: data.indices.len() as u32,
        });
        Ok(())
    }

    fn add_instance(&mut self, instance: MeshInstance) {
        self.instances.push(instance);
        self.instances_dirty = true;
    }

    fn clear_instances(&mut self) {
        self.instances.clear();
        self.instances_dirty = true;
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
        self.pipeline.is_some() && self.mesh.is_some() && !self.instances.is_empty()
    }

    fn render(&mut self, view: Mat4, projection: Mat4, eye: Vec3) -> Result<(), RenderError> {
        self.upload_instances();
        let (Some(pipeline), Some(mesh), Some((instance_buffer, _))) =
            (&self.pipeline, &self.mesh, &self.instance_buffer)
        else {
            return Err(RenderError::NotReady("mesh content not loaded"));
        };
        if self.instances.is_empty() {
            return Err(RenderError::NotReady("no mesh instances"));
        }

        let uniforms = MeshUniforms::new(view, projection, eye, &self.lights);
        self.ctx
            .queue
            .write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&uniforms));

        let Some(frame) = self.ctx.acquire()? else {
            return Ok(());
        };
        let mut encoder = self
            .ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("mesh_encoder"),
            });
        {
            let depth = self.ctx.depth_view();
            let mut pass = begin_pass(&mut encoder, &frame.view, &depth, CLEAR);
            pass.set_pipeline(pipeline);
            pass.set_bind_group(0, &self.uniform_bind_group, &[]);
            pass.set_vertex_buffer(0, mesh.vertices.slice(..));
            pass.set_vertex_buffer(1, instance_buffer.slice(..));
            pass.set_index_buffer(mesh.indices.slice(..), wgpu::IndexFormat::Uint16);
            pass.draw_indexed(0..mesh.index_count, 0, 0..self.instances.len() as u32);
        }
        self.ctx.queue.submit(std::iter::once(encoder.finish()));
        frame.texture.present();
        Ok(())
    }
}
