//! gl-sandbox
//!
//! A small OpenGL 3.3 sandbox built on winit, glutin and glow. It runs one
//! render state at a time inside a minimal game loop and shows the usual
//! building blocks: shader programs, vertex/element buffers, textures and a
//! runtime script compiler.
//!
//! High-level modules
//! - `config`: window configuration
//! - `context`: window + GL context that every render state draws through
//! - `data_structures`: shaders, meshes and textures
//! - `flow`: the render state trait and the event loop driving it
//! - `resources`: helpers to load shaders/textures from the asset directory
//! - `script`: compiles script files and invokes functions on them
//! - `states`: the demo render states
//!

pub mod config;
pub mod context;
pub mod data_structures;
pub mod flow;
pub mod resources;
pub mod script;
pub mod states;

// Re-exports commonly used types for convenience in downstream code.
pub use cgmath;
pub use glow;
pub use glow::HasContext;
pub use rhai::Dynamic;
