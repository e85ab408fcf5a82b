use anyhow::Context as _;

use crate::data_structures::shader::Shader;

use super::load_string;

/// Build the program from `shaders/<name>.vert` and `shaders/<name>.frag`.
pub fn load_shader(gl: &glow::Context, name: &str) -> anyhow::Result<Shader> {
    let vertex = load_string(&format!("shaders/{name}.vert"))?;
    let fragment = load_string(&format!("shaders/{name}.frag"))?;
    Shader::new(gl, &vertex, &fragment).with_context(|| format!("Shader '{name}' is unusable"))
}
