//! GPU-side data structures: shader programs, geometry buffers and textures.
//!
//! - `shader` compiles/links programs and caches uniform locations
//! - `mesh` holds vertex layouts and VAO/VBO/EBO geometry
//! - `texture` wraps 2D textures with fixed sampling parameters
//!
//! Each type is created once and released with an explicit `delete`; the
//! owning render state calls it from `exit`.

pub mod mesh;
pub mod shader;
pub mod texture;
