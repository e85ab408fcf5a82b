//! Window and OpenGL context.
//!
//! [`Context`] owns the winit window, the glutin surface/context pair and the
//! `glow` function table. It is created once when the event loop resumes and
//! handed by reference to every [`crate::flow::RenderState`] callback.

use std::num::NonZeroU32;

use anyhow::{Context as _, anyhow};
use glow::HasContext;
use glutin::{
    config::{ConfigTemplateBuilder, GlConfig},
    context::{ContextApi, ContextAttributesBuilder, GlProfile, PossiblyCurrentContext, Version},
    display::GetGlDisplay,
    prelude::*,
    surface::{Surface, SwapInterval, WindowSurface},
};
use glutin_winit::{DisplayBuilder, GlWindow};
use raw_window_handle::HasWindowHandle;
use winit::{
    dpi::{PhysicalPosition, PhysicalSize},
    event_loop::ActiveEventLoop,
    window::Window,
};

use crate::config::WindowConfig;

#[derive(Debug)]
pub struct Context {
    // Field order matters: GL objects go before the window they render into.
    pub gl: glow::Context,
    gl_surface: Surface<WindowSurface>,
    gl_context: PossiblyCurrentContext,
    pub(crate) window: Window,
    pub config: WindowConfig,
    size: PhysicalSize<u32>,
}

impl Context {
    pub fn new(event_loop: &ActiveEventLoop, config: &WindowConfig) -> anyhow::Result<Self> {
        let template = ConfigTemplateBuilder::new().with_alpha_size(8);
        let display_builder =
            DisplayBuilder::new().with_window_attributes(Some(config.window_attributes()));

        log::debug!("Building GL display for '{}'", config.title);
        let (window, gl_config) = display_builder
            .build(event_loop, template, |configs| {
                // Prefer multisampling when the driver offers it.
                configs
                    .reduce(|accum, config| {
                        if config.num_samples() > accum.num_samples() {
                            config
                        } else {
                            accum
                        }
                    })
                    .expect("glutin always offers at least one config")
            })
            .map_err(|e| anyhow!("Failed to build the GL display: {e}"))?;
        let window = window.context("The GL display did not create a window")?;

        let raw_window_handle = window
            .window_handle()
            .context("Window has no native handle")?
            .as_raw();
        let gl_display = gl_config.display();
        let context_attributes = ContextAttributesBuilder::new()
            .with_context_api(ContextApi::OpenGl(Some(Version::new(3, 3))))
            .with_profile(GlProfile::Core)
            .build(Some(raw_window_handle));
        let not_current = unsafe { gl_display.create_context(&gl_config, &context_attributes) }
            .map_err(|e| anyhow!("Failed to create an OpenGL 3.3 core context: {e}"))?;

        let surface_attributes = window
            .build_surface_attributes(Default::default())
            .context("Failed to describe the window surface")?;
        let gl_surface = unsafe { gl_display.create_window_surface(&gl_config, &surface_attributes) }
            .map_err(|e| anyhow!("Failed to create the window surface: {e}"))?;
        let gl_context = not_current
            .make_current(&gl_surface)
            .map_err(|e| anyhow!("Failed to make the GL context current: {e}"))?;

        let interval = if config.vsync {
            SwapInterval::Wait(NonZeroU32::MIN)
        } else {
            SwapInterval::DontWait
        };
        if let Err(e) = gl_surface.set_swap_interval(&gl_context, interval) {
            log::warn!("Failed to set swap interval (vsync={}): {e}", config.vsync);
        }

        let gl = unsafe {
            glow::Context::from_loader_function_cstr(|name| gl_display.get_proc_address(name))
        };
        log_driver_info(&gl);

        if config.centered {
            center_on_primary(event_loop, &window);
            window.set_visible(true);
        }

        let size = window.inner_size();
        let ctx = Self {
            gl,
            gl_surface,
            gl_context,
            window,
            config: config.clone(),
            size,
        };
        unsafe {
            ctx.gl.viewport(0, 0, size.width as i32, size.height as i32);
        }
        Ok(ctx)
    }

    /// Resize the surface and the GL viewport. Zero sized requests (minimised
    /// windows) are ignored.
    pub fn resize(&mut self, width: u32, height: u32) -> bool {
        let Some((w, h)) = surface_size(width, height) else {
            log::warn!("Ignoring resize to zero dimensions ({width}x{height}).");
            return false;
        };
        self.gl_surface.resize(&self.gl_context, w, h);
        unsafe {
            self.gl.viewport(0, 0, width as i32, height as i32);
        }
        self.size = PhysicalSize::new(width, height);
        true
    }

    pub fn clear(&self) {
        let [r, g, b, a] = self.config.clear_colour;
        unsafe {
            self.gl.clear_color(r, g, b, a);
            self.gl.clear(glow::COLOR_BUFFER_BIT | glow::DEPTH_BUFFER_BIT);
        }
    }

    pub fn swap_buffers(&self) -> anyhow::Result<()> {
        self.gl_surface
            .swap_buffers(&self.gl_context)
            .map_err(|e| anyhow!("Failed to swap buffers: {e}"))
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.config.title = title.into();
        self.window.set_title(&self.config.title);
    }

    pub fn request_redraw(&self) {
        self.window.request_redraw();
    }

    pub fn size(&self) -> (u32, u32) {
        (self.size.width, self.size.height)
    }

    pub fn aspect_ratio(&self) -> f32 {
        aspect_ratio(self.size.width, self.size.height)
    }
}

/// Surface dimensions for a resize request, `None` when either side is zero.
fn surface_size(width: u32, height: u32) -> Option<(NonZeroU32, NonZeroU32)> {
    Some((NonZeroU32::new(width)?, NonZeroU32::new(height)?))
}

fn aspect_ratio(width: u32, height: u32) -> f32 {
    if height == 0 {
        1.0
    } else {
        width as f32 / height as f32
    }
}

fn center_on_primary(event_loop: &ActiveEventLoop, window: &Window) {
    let monitor = event_loop
        .primary_monitor()
        .or_else(|| window.current_monitor());
    let Some(monitor) = monitor else {
        // Wayland never reports a primary monitor and ignores positioning anyway.
        log::debug!("No primary monitor reported, leaving window placement to the compositor");
        return;
    };
    let position = centered_position(monitor.position(), monitor.size(), window.outer_size());
    window.set_outer_position(position);
}

/// Top-left position that centers `window` on a monitor. Windows larger than
/// the monitor are pinned to the monitor origin.
pub fn centered_position(
    monitor_position: PhysicalPosition<i32>,
    monitor_size: PhysicalSize<u32>,
    window: PhysicalSize<u32>,
) -> PhysicalPosition<i32> {
    let offset = |monitor: u32, window: u32| (monitor.saturating_sub(window) / 2) as i32;
    PhysicalPosition::new(
        monitor_position.x + offset(monitor_size.width, window.width),
        monitor_position.y + offset(monitor_size.height, window.height),
    )
}

fn log_driver_info(gl: &glow::Context) {
    unsafe {
        log::info!(
            "OpenGL driver: {} [{}], {}, GLSL {}",
            gl.get_parameter_string(glow::RENDERER).trim(),
            gl.get_parameter_string(glow::VENDOR).trim(),
            gl.get_parameter_string(glow::VERSION).trim(),
            gl.get_parameter_string(glow::SHADING_LANGUAGE_VERSION).trim(),
        );
    }
}
