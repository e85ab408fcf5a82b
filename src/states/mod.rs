//! Demo render states.
//!
//! - `triangle`: a vertex-coloured triangle, `draw_arrays` only
//! - `textured_quad`: a textured quad over an element buffer with a startup script

pub mod textured_quad;
pub mod triangle;

pub use textured_quad::TexturedQuadState;
pub use triangle::TriangleState;
