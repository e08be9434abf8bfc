use crate::context::{GpuContext, begin_pass, depth_stencil};
use crate::geometry::{LineVertex, grid_lines};
use crate::layout::LineUniforms;
use crate::shaders;
use glam::Mat4;
use std::rc::Rc;
use vantage_render::{BasicRenderer, RenderError};
use wgpu::util::DeviceExt;

const GRID_HALF_EXTENT: i32 = 50;
const GRID_SPACING: f32 = 1.0;

const CLEAR: wgpu::Color = wgpu::Color {
    r: 0.08,
    g: 0.08,
    b: 0.1,
    a: 1.0,
};

/// Fallback renderer: an unlit floor grid under the model matrix. Built
/// entirely from built-in content, so it is always drawable.
pub struct WgpuLineRenderer {
    ctx: Rc<GpuContext>,
    pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    vertex_buffer: wgpu::Buffer,
    vertex_count: u32,
    model: Mat4,
    view: Mat4,
    projection: Mat4,
}

impl WgpuLineRenderer {
    pub(crate) fn new(ctx: Rc<GpuContext>) -> Self {
        let device = &ctx.device;
        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("line_uniforms"),
            contents: bytemuck::bytes_of(&LineUniforms::new(Mat4::IDENTITY, Mat4::IDENTITY, Mat4::IDENTITY)),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("line_uniform_layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });
        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("line_uniform_bind_group"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("line_pipeline_layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });
        let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("line_shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::LINE_SHADER.into()),
        });
        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("line_pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &module,
                entry_point: Some("vs_line"),
                compilation_options: Default::default(),
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<LineVertex>() as u64,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x4],
                }],
            },
            fragment: Some(wgpu::FragmentState {
                module: &module,
                entry_point: Some("fs_line"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: ctx.format(),
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::LineList,
                ..Default::default()
            },
            depth_stencil: Some(depth_stencil()),
            multisample: Default::default(),
            multiview: None,
            cache: None,
        });

        let grid = grid_lines(GRID_HALF_EXTENT, GRID_SPACING);
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("grid_vertices"),
            contents: bytemuck::cast_slice(&grid),
            usage: wgpu::BufferUsages::VERTEX,
        });

        Self {
            pipeline,
            uniform_buffer,
            uniform_bind_group,
            vertex_buffer,
            vertex_count: grid.len() as u32,
            model: Mat4::IDENTITY,
            view: Mat4::IDENTITY,
            projection: Mat4::IDENTITY,
            ctx,
        }
    }
}

impl BasicRenderer for WgpuLineRenderer {
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
        let uniforms = LineUniforms::new(self.model, self.view, self.projection);
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
                label: Some("line_encoder"),
            });
        {
            let depth = self.ctx.depth_view();
            let mut pass = begin_pass(&mut encoder, &frame.view, &depth, CLEAR);
            pass.set_pipeline(&self.pipeline);
            pass.set_bind_group(0, &self.uniform_bind_group, &[]);
            pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
            pass.draw(0..self.vertex_count, 0..1);
        }
        self.ctx.queue.submit(std::iter::once(encoder.finish()));
        frame.texture.present();
        Ok(())
    }
}
