use anyhow::{Context as _, Result};
use clap::Parser;
use egui::Context as EguiContext;
use std::path::PathBuf;
use std::sync::Arc;
use torusfield_assets::{LoadEvent, LoadingManager};
use torusfield_controls::DebugPanel;
use torusfield_frame::{FrameLoop, SystemClock};
use torusfield_render_wgpu::{OrbitControls, WgpuRenderer};
use torusfield_scene::{Scene, SceneBuilder, SceneConfig, Viewport};
use torusfield_tools::SceneInspector;
use tracing_subscriber::EnvFilter;
use winit::application::ApplicationHandler;
use winit::dpi::{PhysicalPosition, PhysicalSize};
use winit::event::{ElementState, KeyEvent, MouseButton, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

#[derive(Parser)]
#[command(name = "torusfield-desktop", about = "Torus field desktop viewer")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Scene config (JSON); defaults apply when omitted
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory texture paths are resolved against
    #[arg(long, default_value = "static")]
    assets: PathBuf,

    /// Seed for the ring speed
    #[arg(long)]
    seed: Option<u64>,

    #[arg(long, default_value_t = 1280)]
    width: u32,

    #[arg(long, default_value_t = 720)]
    height: u32,
}

/// Which button is dragging the camera.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Drag {
    Orbit,
    Pan,
}

impl Drag {
    fn from_button(button: MouseButton) -> Option<Self> {
        match button {
            MouseButton::Left => Some(Self::Orbit),
            MouseButton::Right => Some(Self::Pan),
            _ => None,
        }
    }
}

/// Button and cursor bookkeeping for camera drags.
///
/// Releases and cursor positions are recorded even when the UI takes the
/// event, so a drag never outlives its button and never jumps on re-entry.
#[derive(Debug, Default)]
struct PointerDrag {
    active: Option<Drag>,
    cursor: Option<PhysicalPosition<f64>>,
}

impl PointerDrag {
    fn press(&mut self, button: MouseButton) {
        if let Some(drag) = Drag::from_button(button) {
            self.active = Some(drag);
        }
    }

    fn release(&mut self, button: MouseButton) {
        if self.active.is_some() && self.active == Drag::from_button(button) {
            self.active = None;
        }
    }

    /// Record the cursor without moving the camera.
    fn track(&mut self, position: PhysicalPosition<f64>) {
        self.cursor = Some(position);
    }

    /// Record the cursor and return the drag delta since the last position.
    fn moved(&mut self, position: PhysicalPosition<f64>) -> Option<(Drag, f32, f32)> {
        let last = self.cursor.replace(position)?;
        let drag = self.active?;
        Some((
            drag,
            (position.x - last.x) as f32,
            (position.y - last.y) as f32,
        ))
    }

    fn leave(&mut self) {
        *self = Self::default();
    }
}

/// Application state.
struct AppState {
    scene: Scene,
    panel: DebugPanel,
    frame_loop: FrameLoop<SystemClock>,
    orbit: OrbitControls,
    loader: LoadingManager,
    show_panel: bool,
    pointer: PointerDrag,
}

impl AppState {
    fn new(cli: &Cli) -> Result<Self> {
        let mut config = SceneConfig::load_or_default(cli.config.as_deref())?;
        if cli.seed.is_some() {
            config.speed_seed = cli.seed;
        }

        let mut loader = LoadingManager::new();
        let mut rng = config.speed_rng();
        let viewport = Viewport::new(cli.width as f32, cli.height as f32, 1.0);
        let scene =
            SceneBuilder::new(&config, &cli.assets).build(viewport, &mut loader, &mut rng)?;
        let panel = DebugPanel::standard(&scene, rng)?;

        Ok(Self {
            scene,
            panel,
            frame_loop: FrameLoop::new(SystemClock::new()),
            orbit: OrbitControls::new(),
            loader,
            show_panel: true,
            pointer: PointerDrag::default(),
        })
    }

    fn handle_key(&mut self, key: KeyCode, event_loop: &ActiveEventLoop) {
        match key {
            KeyCode::F1 => {
                self.show_panel = !self.show_panel;
            }
            KeyCode::Escape => {
                event_loop.exit();
            }
            _ => {}
        }
    }

    fn handle_cursor(&mut self, position: PhysicalPosition<f64>, height: f32) {
        let Some((drag, dx, dy)) = self.pointer.moved(position) else {
            return;
        };
        match drag {
            Drag::Orbit => self.orbit.rotate(dx, dy, height),
            Drag::Pan => {
                if let Err(e) = self.orbit.pan(dx, dy, height, &self.scene) {
                    tracing::warn!("pan failed: {e}");
                }
            }
        }
    }

    fn draw_ui(&mut self, ctx: &EguiContext) {
        if !self.show_panel {
            return;
        }
        egui::Window::new("Debug")
            .default_width(280.0)
            .resizable(false)
            .show(ctx, |ui| {
                self.panel.show(ui, &mut self.scene);
                ui.separator();
                let summary = SceneInspector::summary(&self.scene);
                ui.label(format!("Speed: {:.4}", summary.speed));
                let progress = self.loader.progress();
                ui.label(format!(
                    "Textures: {}/{} ({} failed)",
                    progress.finished, progress.total, progress.failed
                ));
                ui.separator();
                ui.small("F1: Toggle Panel | LMB: Orbit | RMB: Pan | Esc: Quit");
            });
    }
}

/// Everything that exists only once the window does.
struct Gpu {
    window: Arc<Window>,
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    renderer: WgpuRenderer,
    egui_winit: egui_winit::State,
    egui_renderer: egui_wgpu::Renderer,
}

impl Gpu {
    fn new(
        event_loop: &ActiveEventLoop,
        egui_ctx: &EguiContext,
        scene: &mut Scene,
    ) -> Result<Self> {
        let (width, height) = (scene.viewport.width as u32, scene.viewport.height as u32);
        let attrs = Window::default_attributes()
            .with_title("Torus Field")
            .with_inner_size(PhysicalSize::new(width, height));
        let window = Arc::new(event_loop.create_window(attrs).context("create window")?);

        // The window may come back at a different size or on a HiDPI screen.
        let scale = window.scale_factor();
        let logical = window.inner_size().to_logical::<f32>(scale);
        scene.resize(logical.width, logical.height, scale as f32)?;

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let surface = instance
            .create_surface(window.clone())
            .context("create surface")?;
        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .context("find adapter")?;
        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("torusfield_device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
            },
            None,
        ))
        .context("create device")?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or(surface_caps.formats.first())
            .copied()
            .context("surface has no formats")?;
        let (buffer_width, buffer_height) = scene.viewport.buffer_size();
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: buffer_width,
            height: buffer_height,
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let renderer = WgpuRenderer::new(
            &device,
            &queue,
            surface_format,
            buffer_width,
            buffer_height,
        );
        let egui_winit = egui_winit::State::new(
            egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            Some(scale as f32),
            None,
            None,
        );
        let egui_renderer = egui_wgpu::Renderer::new(&device, surface_format, None, 1, false);

        tracing::info!(
            "GPU initialized with {} backend",
            adapter.get_info().backend.to_str()
        );

        Ok(Self {
            window,
            surface,
            device,
            queue,
            config,
            renderer,
            egui_winit,
            egui_renderer,
        })
    }

    fn resize(&mut self, scene: &mut Scene, size: PhysicalSize<u32>) {
        let scale = self.window.scale_factor();
        let logical = size.to_logical::<f32>(scale);
        if let Err(e) = scene.resize(logical.width, logical.height, scale as f32) {
            tracing::error!("resize failed: {e}");
            return;
        }
        let (width, height) = scene.viewport.buffer_size();
        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);
        self.renderer.resize(&self.device, width, height);
    }

    fn upload_textures(&mut self, loader: &mut LoadingManager) {
        for event in loader.poll() {
            match event {
                LoadEvent::Loaded { handle, texture } => {
                    self.renderer
                        .upload_texture(&self.device, &self.queue, handle, &texture);
                }
                LoadEvent::Failed { handle, error } => {
                    tracing::warn!(handle = handle.0, "rendering without texture: {error}");
                }
                LoadEvent::Progress { .. } => {}
                LoadEvent::AllLoaded(progress) => {
                    tracing::info!(
                        textures = self.renderer.texture_count(),
                        failed = progress.failed,
                        "textures ready"
                    );
                }
            }
        }
    }

    fn draw_ui(&mut self, state: &mut AppState, egui_ctx: &EguiContext, view: &wgpu::TextureView) {
        let raw_input = self.egui_winit.take_egui_input(&self.window);
        let full_output = egui_ctx.run(raw_input, |ctx| {
            state.draw_ui(ctx);
        });
        self.egui_winit
            .handle_platform_output(&self.window, full_output.platform_output);

        let paint_jobs = egui_ctx.tessellate(full_output.shapes, full_output.pixels_per_point);
        // The buffer is capped at the maximum pixel ratio, so the UI is too.
        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [self.config.width, self.config.height],
            pixels_per_point: full_output.pixels_per_point.min(Viewport::MAX_PIXEL_RATIO),
        };

        for (id, image_delta) in &full_output.textures_delta.set {
            self.egui_renderer
                .update_texture(&self.device, &self.queue, *id, image_delta);
        }
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("egui_encoder"),
            });
        self.egui_renderer.update_buffers(
            &self.device,
            &self.queue,
            &mut encoder,
            &paint_jobs,
            &screen_descriptor,
        );
        {
            let mut pass = encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("egui_pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Load,
                            store: wgpu::StoreOp::Store,
                        },
                    })],
                    depth_stencil_attachment: None,
                    ..Default::default()
                })
                .forget_lifetime();
            self.egui_renderer
                .render(&mut pass, &paint_jobs, &screen_descriptor);
        }
        self.queue.submit(std::iter::once(encoder.finish()));
        for id in &full_output.textures_delta.free {
            self.egui_renderer.free_texture(id);
        }
    }

    fn redraw(
        &mut self,
        state: &mut AppState,
        egui_ctx: &EguiContext,
        event_loop: &ActiveEventLoop,
    ) {
        self.upload_textures(&mut state.loader);

        match state.frame_loop.tick(&mut state.scene) {
            Ok(Some(_)) => {}
            Ok(None) => {
                event_loop.exit();
                return;
            }
            Err(e) => {
                tracing::error!("frame failed: {e}");
                return;
            }
        }
        if let Err(e) = state.orbit.update(&mut state.scene) {
            tracing::error!("camera update failed: {e}");
        }

        let output = match self.surface.get_current_texture() {
            Ok(t) => t,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                self.surface.configure(&self.device, &self.config);
                return;
            }
            Err(e) => {
                tracing::error!("surface error: {e}");
                return;
            }
        };
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        if let Err(e) = self
            .renderer
            .render(&self.device, &self.queue, &view, &state.scene)
        {
            tracing::error!("render failed: {e}");
        }
        self.draw_ui(state, egui_ctx, &view);

        output.present();
        self.window.request_redraw();
    }
}

struct GpuApp {
    state: AppState,
    gpu: Option<Gpu>,
    egui_ctx: EguiContext,
}

impl GpuApp {
    fn new(state: AppState) -> Self {
        Self {
            state,
            gpu: None,
            egui_ctx: EguiContext::default(),
        }
    }
}

impl ApplicationHandler for GpuApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.gpu.is_some() {
            return;
        }
        match Gpu::new(event_loop, &self.egui_ctx, &mut self.state.scene) {
            Ok(gpu) => self.gpu = Some(gpu),
            Err(e) => {
                tracing::error!("failed to start renderer: {e:#}");
                event_loop.exit();
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        let Some(gpu) = &mut self.gpu else {
            return;
        };
        let response = gpu.egui_winit.on_window_event(&gpu.window, &event);
        if response.consumed {
            match event {
                WindowEvent::MouseInput {
                    button,
                    state: ElementState::Released,
                    ..
                } => self.state.pointer.release(button),
                WindowEvent::CursorMoved { position, .. } => self.state.pointer.track(position),
                _ => {}
            }
            return;
        }

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                gpu.resize(&mut self.state.scene, new_size);
            }
            WindowEvent::ScaleFactorChanged { .. } => {
                let size = gpu.window.inner_size();
                gpu.resize(&mut self.state.scene, size);
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(key),
                        state: ElementState::Pressed,
                        repeat: false,
                        ..
                    },
                ..
            } => {
                self.state.handle_key(key, event_loop);
            }
            WindowEvent::MouseInput {
                button,
                state: btn_state,
                ..
            } => match btn_state {
                ElementState::Pressed => self.state.pointer.press(button),
                ElementState::Released => self.state.pointer.release(button),
            },
            WindowEvent::CursorMoved { position, .. } => {
                let height = gpu.window.inner_size().height as f32;
                self.state.handle_cursor(position, height);
            }
            WindowEvent::CursorLeft { .. } => {
                self.state.pointer.leave();
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let scroll = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y,
                    MouseScrollDelta::PixelDelta(p) => p.y as f32,
                };
                self.state.orbit.zoom(scroll);
            }
            WindowEvent::RedrawRequested => {
                gpu.redraw(&mut self.state, &self.egui_ctx, event_loop);
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(gpu) = &self.gpu {
            gpu.window.request_redraw();
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    tracing::info!("torusfield-desktop starting");

    let state = AppState::new(&cli)?;

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = GpuApp::new(state);
    event_loop.run_app(&mut app)?;

    Ok(())
}
