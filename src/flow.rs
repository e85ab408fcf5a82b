//! Game loop and render state lifecycle.
//!
//! A [`RenderState`] is the demo being shown: it loads its GPU resources in
//! `init`, advances in `update`, issues draw calls in `draw`, reacts to
//! window size changes in `resize` and releases everything in `exit`.
//! [`run`] owns the winit event loop and drives a single state.
//!
//! # Lifecycle Flow
//!
//! 1. `resumed` creates the window and GL [`Context`], then calls `init`.
//!    An `init` error stops the loop before anything is drawn and is
//!    returned from [`run`].
//! 2. `Resized` resizes the surface and forwards the size to `resize`.
//!    Zero sized events (minimised windows) are dropped before the state
//!    sees them.
//! 3. `RedrawRequested` calls `update` with the frame delta, clears the
//!    frame, calls `draw`, swaps buffers and requests the next frame.
//! 4. `CloseRequested` or [`Out::Exit`] calls `exit` once and leaves the loop.

use std::time::{Duration, Instant};

use winit::{
    application::ApplicationHandler,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, EventLoop},
    window::WindowId,
};

use crate::{config::WindowConfig, context::Context};

/// Output of the lifecycle hooks that may affect the loop.
///
/// `Out::Configure` can be used to modify the Context during runtime, for
/// instance to change the clear colour or the window title.
///
/// `Out::Exit` requests a clean shutdown: `exit` is called and the loop ends.
///
/// `Empty` is the default output used when nothing needs to be handled.
pub enum Out {
    Configure(Box<dyn FnOnce(&mut Context)>),
    Exit,
    Empty,
}

impl Default for Out {
    fn default() -> Self {
        Self::Empty
    }
}

/// Trait for a renderable demo state.
///
/// All hooks run on the event loop thread with the GL context current.
pub trait RenderState {
    /// Load shaders, buffers and textures. Any error is fatal.
    fn init(&mut self, ctx: &mut Context) -> anyhow::Result<()>;

    /// Advance the state by `dt`. Called once per frame before `draw`.
    fn update(&mut self, ctx: &Context, dt: Duration) -> Out;

    /// Issue draw calls. The frame has already been cleared.
    fn draw(&self, ctx: &Context);

    /// React to a new framebuffer size. The viewport is already updated.
    fn resize(&mut self, ctx: &Context, width: u32, height: u32) -> Out;

    /// Release GPU resources. Called exactly once after a successful `init`.
    fn exit(&mut self, ctx: &Context);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Created,
    Running,
    Exited,
}

pub struct App {
    config: WindowConfig,
    ctx: Option<Context>,
    state: Box<dyn RenderState>,
    phase: Phase,
    error: Option<anyhow::Error>,
    last_time: Instant,
}

impl App {
    pub fn new(config: WindowConfig, state: Box<dyn RenderState>) -> Self {
        Self {
            config,
            ctx: None,
            state,
            phase: Phase::Created,
            error: None,
            last_time: Instant::now(),
        }
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: anyhow::Error) {
        log::error!("{err:#}");
        self.error = Some(err);
        self.shutdown(event_loop);
    }

    fn shutdown(&mut self, event_loop: &ActiveEventLoop) {
        if self.phase == Phase::Running {
            if let Some(ctx) = &self.ctx {
                log::info!("Unloading render state");
                self.state.exit(ctx);
            }
        }
        self.phase = Phase::Exited;
        event_loop.exit();
    }

    fn handle_output(&mut self, event_loop: &ActiveEventLoop, out: Out) {
        match out {
            Out::Configure(f) => {
                if let Some(ctx) = &mut self.ctx {
                    f(ctx);
                }
            }
            Out::Exit => self.shutdown(event_loop),
            Out::Empty => (),
        }
    }

    fn frame(&mut self, event_loop: &ActiveEventLoop) {
        let dt = self.last_time.elapsed();
        self.last_time = Instant::now();

        let Some(ctx) = &self.ctx else { return };
        let out = self.state.update(ctx, dt);
        self.handle_output(event_loop, out);
        if self.phase != Phase::Running {
            return;
        }

        let Some(ctx) = &self.ctx else { return };
        ctx.clear();
        self.state.draw(ctx);
        if let Err(e) = ctx.swap_buffers() {
            log::error!("Unable to present frame: {e:#}");
        }
        ctx.request_redraw();
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        // Desktop platforms resume once; the context outlives any later resume.
        if self.ctx.is_some() || self.phase != Phase::Created {
            return;
        }

        let mut ctx = match Context::new(event_loop, &self.config) {
            Ok(ctx) => ctx,
            Err(e) => return self.fail(event_loop, e.context("Cannot create the main context")),
        };

        log::info!("Loading render state");
        if let Err(e) = self.state.init(&mut ctx) {
            self.ctx = Some(ctx);
            return self.fail(event_loop, e.context("Render state failed to initialize"));
        }

        let (width, height) = ctx.size();
        let out = self.state.resize(&ctx, width, height);
        ctx.request_redraw();
        self.ctx = Some(ctx);
        self.phase = Phase::Running;
        self.last_time = Instant::now();
        self.handle_output(event_loop, out);
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        if self.phase != Phase::Running {
            return;
        }

        match event {
            WindowEvent::CloseRequested => self.shutdown(event_loop),
            WindowEvent::Resized(size) => {
                let Some(ctx) = &mut self.ctx else { return };
                if ctx.resize(size.width, size.height) {
                    let out = self.state.resize(ctx, size.width, size.height);
                    self.handle_output(event_loop, out);
                }
            }
            WindowEvent::RedrawRequested => self.frame(event_loop),
            _ => {}
        }
    }

    fn exiting(&mut self, event_loop: &ActiveEventLoop) {
        // Covers platform initiated shutdowns that skip CloseRequested.
        if self.phase == Phase::Running {
            self.shutdown(event_loop);
        }
    }
}

pub fn run(config: WindowConfig, state: Box<dyn RenderState>) -> anyhow::Result<()> {
    if let Err(e) = env_logger::try_init() {
        println!("Warning: Could not initialize logger: {}", e);
    };

    #[cfg(all(feature = "integration-tests", target_os = "linux"))]
    let event_loop: EventLoop<()> = {
        use winit::platform::x11::EventLoopBuilderExtX11;

        EventLoop::builder().with_any_thread(true).build()?
    };

    #[cfg(all(feature = "integration-tests", target_os = "windows"))]
    let event_loop: EventLoop<()> = {
        use winit::platform::windows::EventLoopBuilderExtWindows;

        EventLoop::builder().with_any_thread(true).build()?
    };

    #[cfg(not(all(
        feature = "integration-tests",
        any(target_os = "linux", target_os = "windows")
    )))]
    let event_loop: EventLoop<()> = EventLoop::new()?;

    let mut app = App::new(config, state);
    event_loop.run_app(&mut app)?;

    match app.error.take() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_defaults_to_empty() {
        assert!(matches!(Out::default(), Out::Empty));
    }
}
