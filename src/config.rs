//! Window configuration.
//!
//! The sandbox has no config files or environment overrides; a [`WindowConfig`]
//! is built in code and handed to [`crate::flow::run`]. Changes at runtime go
//! through [`crate::flow::Out::Configure`].

use winit::dpi::PhysicalSize;
use winit::window::WindowAttributes;

/// Window configuration
#[derive(Debug, Clone, PartialEq)]
pub struct WindowConfig {
    /// Window title
    pub title: String,
    /// Inner width in physical pixels
    pub width: u32,
    /// Inner height in physical pixels
    pub height: u32,
    /// RGBA colour the frame is cleared to before drawing
    pub clear_colour: [f32; 4],
    /// Whether to wait for vblank when swapping
    pub vsync: bool,
    /// Whether to center the window on the primary display
    pub centered: bool,
}

impl WindowConfig {
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width.max(1);
        self.height = height.max(1);
        self
    }

    pub fn with_clear_colour(mut self, clear_colour: [f32; 4]) -> Self {
        self.clear_colour = clear_colour.map(|c| c.clamp(0.0, 1.0));
        self
    }

    pub fn with_vsync(mut self, vsync: bool) -> Self {
        self.vsync = vsync;
        self
    }

    pub fn with_centered(mut self, centered: bool) -> Self {
        self.centered = centered;
        self
    }

    /// Creates window attributes from configuration
    pub fn window_attributes(&self) -> WindowAttributes {
        WindowAttributes::default()
            .with_title(self.title.clone())
            .with_inner_size(PhysicalSize::new(self.width, self.height))
            // The window is shown once it has been positioned.
            .with_visible(!self.centered)
    }
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "gl-sandbox".to_string(),
            width: 800,
            height: 600,
            clear_colour: [0.2, 0.3, 0.3, 1.0],
            vsync: true,
            centered: true,
        }
    }
}
