//! Vertex/element buffers.
//!
//! A [`Mesh`] is a VAO with one interleaved float VBO and an optional EBO,
//! uploaded once with `STATIC_DRAW`. [`VertexLayout`] describes how the
//! interleaved floats split into attributes `0..n`.

use std::mem::size_of;

use anyhow::{anyhow, ensure};
use glow::HasContext;

/// Interleaved float vertex layout, one entry per attribute (component count).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VertexLayout {
    components: Vec<i32>,
}

impl VertexLayout {
    pub fn new(components: &[i32]) -> Self {
        debug_assert!(components.iter().all(|c| (1..=4).contains(c)));
        Self {
            components: components.to_vec(),
        }
    }

    pub fn floats_per_vertex(&self) -> usize {
        self.components.iter().map(|&c| c as usize).sum()
    }

    /// Byte distance between two consecutive vertices.
    pub fn stride(&self) -> i32 {
        (self.floats_per_vertex() * size_of::<f32>()) as i32
    }

    /// Byte offset of every attribute inside a vertex.
    pub fn offsets(&self) -> Vec<i32> {
        self.components
            .iter()
            .scan(0, |offset, &c| {
                let current = *offset;
                *offset += c * size_of::<f32>() as i32;
                Some(current)
            })
            .collect()
    }

    pub fn attributes(&self) -> impl Iterator<Item = (u32, i32, i32)> + '_ {
        self.components
            .iter()
            .zip(self.offsets())
            .enumerate()
            .map(|(index, (&size, offset))| (index as u32, size, offset))
    }
}

/// GPU geometry: a VAO, its VBO and an optional EBO.
#[derive(Debug)]
pub struct Mesh {
    vao: glow::VertexArray,
    vbo: glow::Buffer,
    ebo: Option<glow::Buffer>,
    count: i32,
}

impl Mesh {
    pub fn new(
        gl: &glow::Context,
        vertices: &[f32],
        indices: Option<&[u32]>,
        layout: &VertexLayout,
    ) -> anyhow::Result<Self> {
        let vertex_count = validate_geometry(vertices, indices, layout)?;
        let count = indices.map_or(vertex_count, <[u32]>::len) as i32;

        unsafe {
            // Create every handle before touching GL state so a failure can
            // release the ones already made.
            let vao = gl.create_vertex_array().map_err(|e| anyhow!(e))?;
            let vbo = match gl.create_buffer() {
                Ok(vbo) => vbo,
                Err(e) => {
                    gl.delete_vertex_array(vao);
                    return Err(anyhow!(e));
                }
            };
            let ebo = match indices.map(|_| gl.create_buffer()).transpose() {
                Ok(ebo) => ebo,
                Err(e) => {
                    gl.delete_buffer(vbo);
                    gl.delete_vertex_array(vao);
                    return Err(anyhow!(e));
                }
            };

            gl.bind_vertex_array(Some(vao));
            gl.bind_buffer(glow::ARRAY_BUFFER, Some(vbo));
            gl.buffer_data_u8_slice(
                glow::ARRAY_BUFFER,
                bytemuck::cast_slice(vertices),
                glow::STATIC_DRAW,
            );

            if let (Some(ebo), Some(indices)) = (ebo, indices) {
                // The EBO binding is recorded in the bound VAO.
                gl.bind_buffer(glow::ELEMENT_ARRAY_BUFFER, Some(ebo));
                gl.buffer_data_u8_slice(
                    glow::ELEMENT_ARRAY_BUFFER,
                    bytemuck::cast_slice(indices),
                    glow::STATIC_DRAW,
                );
            }

            let stride = layout.stride();
            for (index, size, offset) in layout.attributes() {
                gl.enable_vertex_attrib_array(index);
                gl.vertex_attrib_pointer_f32(index, size, glow::FLOAT, false, stride, offset);
            }

            gl.bind_vertex_array(None);
            gl.bind_buffer(glow::ARRAY_BUFFER, None);

            log::debug!(
                "Uploaded mesh: {} vertices, {} indices",
                vertex_count,
                indices.map_or(0, <[u32]>::len)
            );
            Ok(Self {
                vao,
                vbo,
                ebo,
                count,
            })
        }
    }

    fn is_indexed(&self) -> bool {
        self.ebo.is_some()
    }

    pub fn draw(&self, gl: &glow::Context) {
        unsafe {
            gl.bind_vertex_array(Some(self.vao));
            if self.is_indexed() {
                gl.draw_elements(glow::TRIANGLES, self.count, glow::UNSIGNED_INT, 0);
            } else {
                gl.draw_arrays(glow::TRIANGLES, 0, self.count);
            }
            gl.bind_vertex_array(None);
        }
    }

    pub fn delete(&self, gl: &glow::Context) {
        unsafe {
            gl.delete_vertex_array(self.vao);
            gl.delete_buffer(self.vbo);
            if let Some(ebo) = self.ebo {
                gl.delete_buffer(ebo);
            }
        }
    }
}

/// Returns the number of vertices in `vertices`.
fn validate_geometry(
    vertices: &[f32],
    indices: Option<&[u32]>,
    layout: &VertexLayout,
) -> anyhow::Result<usize> {
    let width = layout.floats_per_vertex();
    ensure!(width > 0, "Vertex layout has no attributes");
    ensure!(
        vertices.len() % width == 0,
        "{} floats do not split into vertices of {} floats",
        vertices.len(),
        width
    );
    let vertex_count = vertices.len() / width;
    ensure!(vertex_count > 0, "Mesh has no vertices");
    if let Some(indices) = indices {
        ensure!(!indices.is_empty(), "Index buffer is empty");
        if let Some(bad) = indices.iter().find(|&&i| i as usize >= vertex_count) {
            anyhow::bail!("Index {bad} is out of range for {vertex_count} vertices");
        }
    }
    Ok(vertex_count)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn position_colour_layout() {
        let layout = VertexLayout::new(&[3, 3]);
        assert_eq!(layout.floats_per_vertex(), 6);
        assert_eq!(layout.stride(), 24);
        assert_eq!(layout.offsets(), vec![0, 12]);
    }

    #[test]
    fn attributes_are_numbered_in_order() {
        let layout = VertexLayout::new(&[3, 3, 2]);
        let attributes: Vec<_> = layout.attributes().collect();
        assert_eq!(attributes, vec![(0, 3, 0), (1, 3, 12), (2, 2, 24)]);
    }

    #[test]
    fn accepts_quad_with_indices() {
        let layout = VertexLayout::new(&[3, 2]);
        let vertices = [0.0; 20];
        let indices = [0, 1, 3, 1, 2, 3];
        assert_eq!(validate_geometry(&vertices, Some(&indices), &layout).unwrap(), 4);
    }

    #[test]
    fn rejects_partial_vertex() {
        let layout = VertexLayout::new(&[3, 3]);
        let err = validate_geometry(&[0.0; 7], None, &layout).unwrap_err();
        assert!(err.to_string().contains("7 floats"));
    }

    #[test]
    fn rejects_out_of_range_index() {
        let layout = VertexLayout::new(&[3]);
        let err = validate_geometry(&[0.0; 9], Some(&[0, 1, 3]), &layout).unwrap_err();
        assert!(err.to_string().contains("Index 3"));
    }

    #[test]
    fn rejects_empty_geometry() {
        let layout = VertexLayout::new(&[3]);
        assert!(validate_geometry(&[], None, &layout).is_err());
        assert!(validate_geometry(&[0.0; 3], Some(&[]), &layout).is_err());
    }
}
