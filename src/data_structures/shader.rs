//! Shader programs.
//!
//! [`Shader`] compiles and links a vertex/fragment pair and caches the
//! location of every active uniform once, right after linking.

use std::{collections::HashMap, fmt};

use anyhow::{anyhow, bail};
use cgmath::Matrix4;
use glow::{HasContext, UniformLocation};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl ShaderStage {
    fn gl_enum(self) -> u32 {
        match self {
            Self::Vertex => glow::VERTEX_SHADER,
            Self::Fragment => glow::FRAGMENT_SHADER,
        }
    }
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Vertex => f.write_str("vertex"),
            Self::Fragment => f.write_str("fragment"),
        }
    }
}

/// A linked program and its uniform name → location table.
#[derive(Debug)]
pub struct Shader {
    pub program: glow::Program,
    uniforms: HashMap<String, UniformLocation>,
}

impl Shader {
    /// Compile and link a program.
    ///
    /// Compile and link failures carry the driver's info log; callers treat
    /// them as fatal.
    pub fn new(gl: &glow::Context, vertex_src: &str, fragment_src: &str) -> anyhow::Result<Self> {
        let vertex = compile_stage(gl, ShaderStage::Vertex, vertex_src)?;
        let fragment = match compile_stage(gl, ShaderStage::Fragment, fragment_src) {
            Ok(fragment) => fragment,
            Err(e) => {
                unsafe { gl.delete_shader(vertex) };
                return Err(e);
            }
        };

        unsafe {
            let program = gl.create_program().map_err(|e| anyhow!(e))?;
            gl.attach_shader(program, vertex);
            gl.attach_shader(program, fragment);
            gl.link_program(program);
            let linked = gl.get_program_link_status(program);

            gl.detach_shader(program, vertex);
            gl.detach_shader(program, fragment);
            gl.delete_shader(vertex);
            gl.delete_shader(fragment);

            if !linked {
                let log = gl.get_program_info_log(program);
                gl.delete_program(program);
                bail!("Shader program failed to link: {}", log.trim());
            }

            let uniforms = active_uniforms(gl, program);
            log::debug!("Linked shader program with {} uniforms", uniforms.len());
            Ok(Self { program, uniforms })
        }
    }

    pub fn bind(&self, gl: &glow::Context) {
        unsafe { gl.use_program(Some(self.program)) };
    }

    pub fn uniform_location(&self, name: &str) -> Option<&UniformLocation> {
        self.uniforms.get(name)
    }

    pub fn set_i32(&self, gl: &glow::Context, name: &str, value: i32) {
        if let Some(location) = self.location_or_warn(name) {
            unsafe { gl.uniform_1_i32(Some(location), value) };
        }
    }

    pub fn set_f32(&self, gl: &glow::Context, name: &str, value: f32) {
        if let Some(location) = self.location_or_warn(name) {
            unsafe { gl.uniform_1_f32(Some(location), value) };
        }
    }

    pub fn set_vec4(&self, gl: &glow::Context, name: &str, value: [f32; 4]) {
        if let Some(location) = self.location_or_warn(name) {
            unsafe { gl.uniform_4_f32_slice(Some(location), &value) };
        }
    }

    pub fn set_mat4(&self, gl: &glow::Context, name: &str, value: &Matrix4<f32>) {
        if let Some(location) = self.location_or_warn(name) {
            let columns: &[f32; 16] = value.as_ref();
            unsafe { gl.uniform_matrix_4_f32_slice(Some(location), false, columns) };
        }
    }

    pub fn delete(&self, gl: &glow::Context) {
        unsafe { gl.delete_program(self.program) };
    }

    fn location_or_warn(&self, name: &str) -> Option<&UniformLocation> {
        let location = self.uniforms.get(name);
        if location.is_none() {
            // The linker strips unused uniforms, so this is not an error.
            log::warn!("Uniform '{name}' is not active in this program");
        }
        location
    }
}

fn compile_stage(
    gl: &glow::Context,
    stage: ShaderStage,
    source: &str,
) -> anyhow::Result<glow::Shader> {
    unsafe {
        let shader = gl.create_shader(stage.gl_enum()).map_err(|e| anyhow!(e))?;
        gl.shader_source(shader, source);
        gl.compile_shader(shader);
        if !gl.get_shader_compile_status(shader) {
            let log = gl.get_shader_info_log(shader);
            gl.delete_shader(shader);
            bail!("{stage} shader failed to compile: {}", log.trim());
        }
        Ok(shader)
    }
}

unsafe fn active_uniforms(
    gl: &glow::Context,
    program: glow::Program,
) -> HashMap<String, UniformLocation> {
    let mut uniforms = HashMap::new();
    unsafe {
        for index in 0..gl.get_active_uniforms(program) {
            let Some(active) = gl.get_active_uniform(program, index) else {
                continue;
            };
            let name = uniform_base_name(&active.name);
            if let Some(location) = gl.get_uniform_location(program, name) {
                uniforms.insert(name.to_string(), location);
            }
        }
    }
    uniforms
}

/// Drivers report array uniforms as `name[0]`; the table stores them as `name`.
fn uniform_base_name(raw: &str) -> &str {
    raw.strip_suffix("[0]").unwrap_or(raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_array_suffix() {
        assert_eq!(uniform_base_name("u_lights[0]"), "u_lights");
        assert_eq!(uniform_base_name("u_time"), "u_time");
        // Only the first element marker is normalised.
        assert_eq!(uniform_base_name("u_lights[1]"), "u_lights[1]");
    }

    #[test]
    fn stage_names_match_driver_wording() {
        assert_eq!(ShaderStage::Vertex.to_string(), "vertex");
        assert_eq!(ShaderStage::Fragment.to_string(), "fragment");
        assert_eq!(ShaderStage::Vertex.gl_enum(), glow::VERTEX_SHADER);
        assert_eq!(ShaderStage::Fragment.gl_enum(), glow::FRAGMENT_SHADER);
    }
}
