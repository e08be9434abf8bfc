use crate::context::GpuContext;
use crate::lines::WgpuLineRenderer;
use crate::mesh::WgpuMeshRenderer;
use std::rc::Rc;
use vantage_render::{Backend, DrawSurface, FreeCamera, Perspective, RenderError};

/// GPU backend over a window surface.
pub struct WgpuBackend {
    ctx: Rc<GpuContext>,
    adapter: wgpu::AdapterInfo,
}

impl WgpuBackend {
    /// Readiness future: instance, surface, adapter, device. Resolves to an
    /// error if any step fails; nothing is retried.
    pub async fn request(
        target: impl Into<wgpu::SurfaceTarget<'static>>,
        width: u32,
        height: u32,
    ) -> Result<Self, RenderError> {
        let unavailable = |what: &str, e: &dyn std::fmt::Display| {
            RenderError::BackendUnavailable(format!("{what}: {e}"))
        };

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let surface = instance
            .create_surface(target)
            .map_err(|e| unavailable("create surface", &e))?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or_else(|| RenderError::BackendUnavailable("no compatible GPU adapter".into()))?;

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("vantage_device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    memory_hints: Default::default(),
                },
                None,
            )
            .await
            .map_err(|e| unavailable("request device", &e))?;

        let caps = surface.get_capabilities(&adapter);
        let format = caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or(caps.formats.first())
            .copied()
            .ok_or_else(|| RenderError::BackendUnavailable("surface reports no formats".into()))?;
        let alpha_mode = caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: width.max(1),
            height: height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };

        let info = adapter.get_info();
        tracing::info!(
            adapter = %info.name,
            api = info.backend.to_str(),
            ?format,
            "GPU device ready"
        );

        Ok(Self {
            ctx: Rc::new(GpuContext::new(device, queue, surface, config)),
            adapter: info,
        })
    }

    pub fn adapter_info(&self) -> &wgpu::AdapterInfo {
        &self.adapter
    }

    pub fn context(&self) -> &GpuContext {
        &self.ctx
    }
}

impl Backend for WgpuBackend {
    type Camera = FreeCamera;
    type Primary = WgpuMeshRenderer;
    type Fallback = WgpuLineRenderer;
    type Surface = WgpuSurface;

    fn name(&self) -> &str {
        "wgpu"
    }

    fn create_camera(&mut self, perspective: Perspective) -> FreeCamera {
        FreeCamera::new(perspective)
    }

    fn create_primary(&mut self) -> Result<WgpuMeshRenderer, RenderError> {
        Ok(WgpuMeshRenderer::new(self.ctx.clone()))
    }

    fn create_fallback(&mut self) -> WgpuLineRenderer {
        WgpuLineRenderer::new(self.ctx.clone())
    }

    fn create_surface(&mut self, width: u32, height: u32) -> WgpuSurface {
        WgpuSurface {
            ctx: self.ctx.clone(),
            target: None,
            width,
            height,
        }
    }
}

/// The window's swapchain. `init` sizes it; `resize` follows the window.
pub struct WgpuSurface {
    ctx: Rc<GpuContext>,
    target: Option<String>,
    width: u32,
    height: u32,
}

impl WgpuSurface {
    pub fn target(&self) -> Option<&str> {
        self.target.as_deref()
    }
}

impl DrawSurface for WgpuSurface {
    fn init(&mut self, target: &str) -> Result<(), RenderError> {
        if self.target.is_some() {
            return Ok(());
        }
        if self.width == 0 || self.height == 0 {
            return Err(RenderError::SurfaceBind {
                target: target.to_string(),
                reason: format!("zero-sized surface {}x{}", self.width, self.height),
            });
        }
        self.ctx.configure(self.width, self.height);
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
        if self.target.is_some() {
            self.ctx.configure(width, height);
        }
    }
}
