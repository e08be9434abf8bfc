use std::cell::RefCell;
use vantage_render::RenderError;

pub(crate) const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Device, queue, and the configured window surface, shared by the
/// renderers and the drawing surface of one backend.
pub struct GpuContext {
    pub(crate) device: wgpu::Device,
    pub(crate) queue: wgpu::Queue,
    surface: wgpu::Surface<'static>,
    config: RefCell<wgpu::SurfaceConfiguration>,
    depth: RefCell<wgpu::TextureView>,
}

/// One acquired swapchain image plus the views to draw into it.
pub(crate) struct Frame {
    pub texture: wgpu::SurfaceTexture,
    pub view: wgpu::TextureView,
}

impl GpuContext {
    pub(crate) fn new(
        device: wgpu::Device,
        queue: wgpu::Queue,
        surface: wgpu::Surface<'static>,
        config: wgpu::SurfaceConfiguration,
    ) -> Self {
        surface.configure(&device, &config);
        let depth = create_depth_view(&device, config.width, config.height);
        Self {
            device,
            queue,
            surface,
            config: RefCell::new(config),
            depth: RefCell::new(depth),
        }
    }

    pub fn format(&self) -> wgpu::TextureFormat {
        self.config.borrow().format
    }

    pub fn size(&self) -> (u32, u32) {
        let config = self.config.borrow();
        (config.width, config.height)
    }

    /// Reconfigure the surface and depth buffer. Zero sizes clamp to one.
    pub(crate) fn configure(&self, width: u32, height: u32) {
        let mut config = self.config.borrow_mut();
        config.width = width.max(1);
        config.height = height.max(1);
        self.surface.configure(&self.device, &config);
        *self.depth.borrow_mut() = create_depth_view(&self.device, config.width, config.height);
    }

    /// Acquire the next swapchain image. `Ok(None)` means the surface was
    /// stale and has been reconfigured; the caller skips this frame.
    pub(crate) fn acquire(&self) -> Result<Option<Frame>, RenderError> {
        match self.surface.get_current_texture() {
            Ok(texture) => {
                let view = texture.texture.create_view(&wgpu::TextureViewDescriptor::default());
                Ok(Some(Frame { texture, view }))
            }
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                tracing::debug!("surface outdated, reconfiguring");
                self.surface.configure(&self.device, &self.config.borrow());
                Ok(None)
            }
            Err(e) => Err(RenderError::Draw(format!("surface error: {e}"))),
        }
    }

    pub(crate) fn depth_view(&self) -> std::cell::Ref<'_, wgpu::TextureView> {
        self.depth.borrow()
    }

    /// Run `build` inside a validation error scope and report what it caught.
    pub(crate) fn validated<T>(&self, build: impl FnOnce(&wgpu::Device) -> T) -> Result<T, String> {
        self.device.push_error_scope(wgpu::ErrorFilter::Validation);
        let value = build(&self.device);
        match pollster::block_on(self.device.pop_error_scope()) {
            Some(e) => Err(e.to_string()),
            None => Ok(value),
        }
    }
}

fn create_depth_view(device: &wgpu::Device, width: u32, height: u32) -> wgpu::TextureView {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("depth_texture"),
        size: wgpu::Extent3d {
            width: width.max(1),
            height: height.max(1),
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    texture.create_view(&Default::default())
}

/// Depth state shared by every pipeline.
pub(crate) fn depth_stencil() -> wgpu::DepthStencilState {
    wgpu::DepthStencilState {
        format: DEPTH_FORMAT,
        depth_write_enabled: true,
        depth_compare: wgpu::CompareFunction::Less,
        stencil: Default::default(),
        bias: Default::default(),
    }
}

/// Begin the single pass of a frame: clear color and depth.
pub(crate) fn begin_pass<'e>(
    encoder: &'e mut wgpu::CommandEncoder,
    color: &wgpu::TextureView,
    depth: &wgpu::TextureView,
    clear: wgpu::Color,
) -> wgpu::RenderPass<'e> {
    encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
        label: Some("main_pass"),
        color_attachments: &[Some(wgpu::RenderPassColorAttachment {
            view: color,
            resolve_target: None,
            ops: wgpu::Operations {
                load: wgpu::LoadOp::Clear(clear),
                store: wgpu::StoreOp::Store,
            },
        })],
        depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
            view: depth,
            depth_ops: Some(wgpu::Operations {
                load: wgpu::LoadOp::Clear(1.0),
                store: wgpu::StoreOp::Store,
            }),
            stencil_ops: None,
        }),
        ..Default::default()
    })
}
