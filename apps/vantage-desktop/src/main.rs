use anyhow::{Context, Result};
use clap::Parser;
use std::cell::Cell;
use std::path::PathBuf;
use std::rc::Rc;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use vantage_common::ViewerConfig;
use vantage_input::{KeyCode, MouseButton};
use vantage_kernel::{FrameRequester, FrameToken, RenderPath, Viewer};
use vantage_render_wgpu::WgpuBackend;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{self, PhysicalKey};
use winit::window::{Window, WindowId};

#[derive(Parser)]
#[command(name = "vantage-desktop", about = "Interactive 3D viewer")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Viewer configuration file (YAML or JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,
}

/// Frame source backed by window redraws. The pending token is delivered on
/// the next `RedrawRequested`.
struct RedrawFrames {
    window: Arc<Window>,
    pending: Rc<Cell<Option<FrameToken>>>,
    next_id: u64,
}

impl FrameRequester for RedrawFrames {
    fn request_frame(&mut self) -> FrameToken {
        self.next_id += 1;
        let token = FrameToken(self.next_id);
        self.pending.set(Some(token));
        self.window.request_redraw();
        token
    }

    fn cancel_frame(&mut self, token: FrameToken) {
        if self.pending.get() == Some(token) {
            self.pending.set(None);
        }
    }
}

type DesktopViewer = Viewer<WgpuBackend, RedrawFrames>;

struct App {
    config: ViewerConfig,
    window: Option<Arc<Window>>,
    viewer: Option<DesktopViewer>,
    pending: Rc<Cell<Option<FrameToken>>>,
    shown_path: Option<RenderPath>,
}

impl App {
    fn new(config: ViewerConfig) -> Self {
        Self {
            config,
            window: None,
            viewer: None,
            pending: Rc::new(Cell::new(None)),
            shown_path: None,
        }
    }

    fn set_title(&self, status: &str) {
        if let Some(window) = &self.window {
            window.set_title(&format!("Vantage [{status}]"));
        }
    }

    fn refresh_title(&mut self) {
        let path = self.viewer.as_ref().and_then(|v| v.render_path());
        if path != self.shown_path {
            self.shown_path = path;
            match path {
                Some(RenderPath::Primary) => self.set_title("mesh renderer"),
                Some(RenderPath::Fallback) => self.set_title("fallback renderer"),
                None => self.set_title("ready"),
            }
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let attrs = Window::default_attributes()
            .with_title("Vantage [initializing]")
            .with_inner_size(PhysicalSize::new(self.config.surface_width, self.config.surface_height));
        let window = match event_loop.create_window(attrs) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                tracing::error!("failed to create window: {e}");
                event_loop.exit();
                return;
            }
        };

        let size = window.inner_size();
        let config = ViewerConfig {
            surface_width: size.width,
            surface_height: size.height,
            ..self.config.clone()
        };
        let frames = RedrawFrames {
            window: window.clone(),
            pending: self.pending.clone(),
            next_id: 0,
        };
        let mut viewer = Viewer::new(config, frames);
        let ready = WgpuBackend::request(window.clone(), size.width, size.height);
        self.window = Some(window);

        match pollster::block_on(viewer.initialize(ready)) {
            Ok(()) => self.set_title("ready"),
            Err(e) => {
                tracing::error!("viewer initialization failed: {e}");
                self.set_title("backend unavailable");
            }
        }
        self.viewer = Some(viewer);
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        let Some(viewer) = self.viewer.as_mut() else {
            if matches!(event, WindowEvent::CloseRequested) {
                event_loop.exit();
            }
            return;
        };

        match event {
            WindowEvent::CloseRequested => {
                viewer.stop();
                event_loop.exit();
            }
            WindowEvent::Resized(size) => viewer.resize(size.width, size.height),
            WindowEvent::Focused(false) => viewer.on_focus_lost(),
            WindowEvent::Occluded(occluded) => {
                if occluded {
                    viewer.stop();
                } else {
                    viewer.start();
                }
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(code),
                        state,
                        repeat: false,
                        ..
                    },
                ..
            } => {
                if let Some(key) = map_key(code) {
                    viewer.on_key(key, state == ElementState::Pressed);
                }
            }
            WindowEvent::MouseInput { button, state, .. } => {
                viewer.on_mouse_button(map_button(button), state == ElementState::Pressed);
            }
            WindowEvent::CursorMoved { position, .. } => {
                viewer.on_mouse_move(position.x as f32, position.y as f32);
            }
            WindowEvent::RedrawRequested => {
                if let Some(token) = self.pending.take() {
                    viewer.on_frame(token);
                    self.refresh_title();
                }
            }
            _ => {}
        }
    }
}

macro_rules! key_map {
    ($code:expr; $($name:ident),* $(,)?) => {
        match $code {
            $(keyboard::KeyCode::$name => Some(KeyCode::$name),)*
            _ => None,
        }
    };
}

fn map_key(code: keyboard::KeyCode) -> Option<KeyCode> {
    key_map!(code;
        KeyA, KeyB, KeyC, KeyD, KeyE, KeyF, KeyG, KeyH, KeyI, KeyJ, KeyK, KeyL, KeyM,
        KeyN, KeyO, KeyP, KeyQ, KeyR, KeyS, KeyT, KeyU, KeyV, KeyW, KeyX, KeyY, KeyZ,
        ArrowUp, ArrowDown, ArrowLeft, ArrowRight,
        Space, ShiftLeft, ShiftRight, ControlLeft, ControlRight, Escape, Enter, Tab,
    )
}

fn map_button(button: winit::event::MouseButton) -> MouseButton {
    use winit::event::MouseButton as W;
    match button {
        W::Left => MouseButton::Left,
        W::Middle => MouseButton::Middle,
        W::Right => MouseButton::Right,
        W::Back => MouseButton::Back,
        W::Forward => MouseButton::Forward,
        W::Other(n) => MouseButton::Other(n),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    let config = match &cli.config {
        Some(path) => ViewerConfig::load(path).with_context(|| format!("loading {}", path.display()))?,
        None => ViewerConfig::default(),
    };
    tracing::info!("vantage-desktop starting");

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Wait);

    let mut app = App::new(config);
    event_loop.run_app(&mut app)?;

    Ok(())
}
