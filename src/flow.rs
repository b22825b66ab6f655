//! Application lifecycle and event loop.
//!
//! The application moves through three phases, tracked by [`Lifecycle`]:
//! `Initializing` until the window, surface and device exist, `Running` while
//! frames are drawn, and `ShuttingDown` once a quit was requested or setup
//! failed. A setup failure is the only fatal error: it ends the event loop and
//! [`run`] reports it so the process can exit with a failure status.
//!
//! # Frame order
//!
//! winit delivers every pending window event before `RedrawRequested`, so by
//! the time a frame starts all input is drained. Each frame then:
//! 1. samples the held keys and moves the camera
//! 2. clears colour and depth
//! 3. activates the shader, uploads `mvp`, draws the cube
//! 4. presents
//! 5. advances the cube's spin and counts the frame

use std::{fmt, iter, sync::Arc};

use instant::{Duration, Instant};
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::{ElementState, KeyEvent, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

use crate::{
    context::Context, error::ContextError, input::KeyState,
    resources::ledger::ResourceLedger, scene::CubeScene, settings::Settings,
};

/// Closing the window and pressing Escape both end the application.
pub fn is_quit_request(event: &WindowEvent) -> bool {
    matches!(
        event,
        WindowEvent::CloseRequested
            | WindowEvent::KeyboardInput {
                event: KeyEvent {
                    physical_key: PhysicalKey::Code(KeyCode::Escape),
                    state: ElementState::Pressed,
                    ..
                },
                ..
            }
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Initializing,
    Running,
    ShuttingDown,
}

/// Phase bookkeeping for the application loop.
#[derive(Debug)]
pub struct Lifecycle {
    phase: Phase,
    initializations: u32,
    frames: u64,
    failure: Option<String>,
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self::new()
    }
}

impl Lifecycle {
    pub fn new() -> Self {
        Self {
            phase: Phase::Initializing,
            initializations: 0,
            frames: 0,
            failure: None,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Setup finished: `Initializing -> Running`. Ignored in any other phase.
    pub fn initialized(&mut self) {
        if self.phase == Phase::Initializing {
            self.phase = Phase::Running;
            self.initializations += 1;
            log::info!("running");
        }
    }

    /// Setup failed: straight to `ShuttingDown`, remembering why. The reason
    /// is reported by [`into_result`](Self::into_result).
    pub fn fail(&mut self, reason: impl fmt::Display) {
        self.failure = Some(reason.to_string());
        self.phase = Phase::ShuttingDown;
    }

    pub fn request_quit(&mut self) {
        if self.phase != Phase::ShuttingDown {
            log::info!("shutting down after {} frame(s)", self.frames);
            self.phase = Phase::ShuttingDown;
        }
    }

    /// Whether a frame should be drawn at all.
    pub fn begin_frame(&self) -> bool {
        self.phase == Phase::Running
    }

    /// Count a frame that reached the screen. Frames dropped on surface
    /// errors are never counted.
    pub fn frame_presented(&mut self) {
        if self.phase == Phase::Running {
            self.frames += 1;
        }
    }

    pub fn initializations(&self) -> u32 {
        self.initializations
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn failure(&self) -> Option<&str> {
        self.failure.as_deref()
    }

    /// `Ok` unless setup failed.
    pub fn into_result(self) -> anyhow::Result<()> {
        match self.failure {
            Some(reason) => Err(anyhow::anyhow!(reason)),
            None => Ok(()),
        }
    }
}

/// Everything that only exists while running. Dropping it releases the
/// scene's GPU objects first, then the context and finally the window.
#[derive(Debug)]
struct AppState {
    scene: CubeScene,
    ctx: Context,
}

impl AppState {
    fn resize(&mut self, width: u32, height: u32) {
        if self.ctx.resize(width, height) {
            self.scene.resize(width, height);
        }
    }

    fn render(&mut self) -> Result<(), wgpu::CurrentSurfaceTexture> {
        let output = match self.ctx.surface.get_current_texture() {
            wgpu::CurrentSurfaceTexture::Success(output)
            | wgpu::CurrentSurfaceTexture::Suboptimal(output) => output,
            other => return Err(other),
        };
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder =
            self.ctx
                .gpu
                .device
                .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("Render Encoder"),
                });
        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.ctx.clear_colour),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: self.ctx.depth_view(),
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
                multiview_mask: None,
            });

            self.scene.draw(&self.ctx.gpu.queue, &mut render_pass);
        }

        self.ctx.gpu.queue.submit(iter::once(encoder.finish()));
        output.present();
        Ok(())
    }
}

/// Logs the frame rate once per second at debug level.
#[derive(Debug)]
struct FrameStats {
    since: Instant,
    frames: u32,
}

impl FrameStats {
    fn new() -> Self {
        Self {
            since: Instant::now(),
            frames: 0,
        }
    }

    fn tick(&mut self) {
        self.frames += 1;
        let elapsed = self.since.elapsed();
        if elapsed >= Duration::from_secs(1) {
            log::debug!(
                "{} frames in {:?} ({:.1} fps)",
                self.frames,
                elapsed,
                self.frames as f64 / elapsed.as_secs_f64()
            );
            self.since = Instant::now();
            self.frames = 0;
        }
    }
}

pub struct App {
    settings: Settings,
    async_runtime: tokio::runtime::Runtime,
    lifecycle: Lifecycle,
    keys: KeyState,
    state: Option<AppState>,
    ledger: Option<Arc<ResourceLedger>>,
    stats: FrameStats,
}

impl App {
    pub fn new(settings: Settings) -> anyhow::Result<Self> {
        let async_runtime = tokio::runtime::Runtime::new()?;
        Ok(Self {
            settings,
            async_runtime,
            lifecycle: Lifecycle::new(),
            keys: KeyState::new(),
            state: None,
            ledger: None,
            stats: FrameStats::new(),
        })
    }

    pub fn lifecycle(&self) -> &Lifecycle {
        &self.lifecycle
    }

    pub fn into_lifecycle(self) -> Lifecycle {
        self.lifecycle
    }

    /// The GPU's resource ledger, once setup succeeded. It outlives the
    /// context, so it can be checked after teardown.
    pub fn ledger(&self) -> Option<&Arc<ResourceLedger>> {
        self.ledger.as_ref()
    }

    fn frame_limit_reached(&self) -> bool {
        matches!(self.settings.quit_after_frames, Some(limit) if self.lifecycle.frames() >= limit)
    }

    fn initialize(&self, event_loop: &ActiveEventLoop) -> Result<AppState, ContextError> {
        let window_attributes = Window::default_attributes()
            .with_title(self.settings.title.clone())
            .with_inner_size(PhysicalSize::new(self.settings.width, self.settings.height))
            .with_resizable(self.settings.resizable);
        let window = Arc::new(event_loop.create_window(window_attributes)?);

        let ctx = self
            .async_runtime
            .block_on(Context::new(window, &self.settings))?;
        let scene = CubeScene::new(&ctx, &self.settings);
        Ok(AppState { scene, ctx })
    }

    fn quit(&mut self, event_loop: &ActiveEventLoop) {
        self.lifecycle.request_quit();
        event_loop.exit();
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        if !self.lifecycle.begin_frame() {
            return;
        }
        let Some(state) = self.state.as_mut() else {
            return;
        };

        state.scene.update(&self.keys);
        match state.render() {
            Ok(()) => {
                state.scene.finish_frame();
                self.lifecycle.frame_presented();
                self.stats.tick();
                if self.frame_limit_reached() {
                    self.quit(event_loop);
                }
            }
            // Reconfigure the surface if it's lost or outdated
            Err(wgpu::CurrentSurfaceTexture::Lost | wgpu::CurrentSurfaceTexture::Outdated) => {
                log::warn!("surface lost or outdated, reconfiguring");
                let size = state.ctx.window.inner_size();
                state.resize(size.width, size.height);
            }
            Err(e) => {
                log::error!("Unable to render {:?}", e);
            }
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        // Some platforms resume more than once; setup happens only the first time.
        if self.lifecycle.phase() != Phase::Initializing {
            return;
        }
        match self.initialize(event_loop) {
            Ok(state) => {
                state.ctx.window.request_redraw();
                self.ledger = Some(Arc::clone(state.ctx.gpu.ledger()));
                self.state = Some(state);
                self.lifecycle.initialized();
                if self.frame_limit_reached() {
                    self.quit(event_loop);
                }
            }
            Err(e) => {
                self.lifecycle.fail(format!("initialization failed: {}", e));
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
        if self.state.is_none() {
            return;
        }
        self.keys.handle_window_event(&event);

        if is_quit_request(&event) {
            self.quit(event_loop);
            return;
        }
        match event {
            WindowEvent::Resized(size) => {
                if let Some(state) = self.state.as_mut() {
                    state.resize(size.width, size.height);
                }
            }
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(state) = &self.state {
            state.ctx.window.request_redraw();
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        self.lifecycle.request_quit();
        if self.state.take().is_some() {
            log::info!("released scene, context and window");
        }
    }
}

/// Open the window and run until it is closed.
///
/// Returns an error if the window or GPU could not be set up.
pub fn run(settings: Settings) -> anyhow::Result<()> {
    run_until_exit(settings)?.into_lifecycle().into_result()
}

/// Like [`run`], but hands back the finished [`App`] so its lifecycle and
/// ledger can be inspected. Setup failures are recorded in the lifecycle
/// rather than returned.
pub fn run_until_exit(settings: Settings) -> anyhow::Result<App> {
    if let Err(e) = env_logger::try_init() {
        println!("Warning: Could not initialize logger: {}", e);
    };

    #[cfg(all(feature = "integration-tests", target_os = "linux"))]
    let event_loop = {
        use winit::platform::wayland::EventLoopBuilderExtWayland;

        EventLoop::builder()
            .with_any_thread(true)
            .build()
            .map_err(ContextError::from)?
    };

    #[cfg(all(feature = "integration-tests", target_os = "windows"))]
    let event_loop = {
        use winit::platform::windows::EventLoopBuilderExtWindows;

        EventLoop::builder()
            .with_any_thread(true)
            .build()
            .map_err(ContextError::from)?
    };

    #[cfg(not(all(
        feature = "integration-tests",
        any(target_os = "linux", target_os = "windows")
    )))]
    let event_loop = EventLoop::new().map_err(ContextError::from)?;

    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(settings)?;
    event_loop.run_app(&mut app)?;
    Ok(app)
}
