use std::time::Duration;

use crate::{
    context::Context,
    data_structures::{
        mesh::{Mesh, VertexLayout},
        shader::Shader,
    },
    flow::{Out, RenderState},
    resources,
};

// Position (xyz), colour (rgb).
#[rustfmt::skip]
const VERTICES: [f32; 18] = [
    -0.5, -0.5, 0.0,   1.0, 0.0, 0.0,
     0.5, -0.5, 0.0,   0.0, 1.0, 0.0,
     0.0,  0.5, 0.0,   0.0, 0.0, 1.0,
];

struct Resources {
    shader: Shader,
    mesh: Mesh,
}

/// A vertex-coloured triangle drawn without an index buffer. `u_time`
/// drives a brightness pulse in the fragment shader.
#[derive(Default)]
pub struct TriangleState {
    resources: Option<Resources>,
    elapsed: Duration,
}

impl TriangleState {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RenderState for TriangleState {
    fn init(&mut self, ctx: &mut Context) -> anyhow::Result<()> {
        let shader = resources::load_shader(&ctx.gl, "triangle")?;
        let mesh = match Mesh::new(&ctx.gl, &VERTICES, None, &VertexLayout::new(&[3, 3])) {
            Ok(mesh) => mesh,
            Err(e) => {
                shader.delete(&ctx.gl);
                return Err(e);
            }
        };
        self.resources = Some(Resources { shader, mesh });
        Ok(())
    }

    fn update(&mut self, _: &Context, dt: Duration) -> Out {
        self.elapsed += dt;
        Out::Empty
    }

    fn draw(&self, ctx: &Context) {
        let Some(res) = &self.resources else { return };
        res.shader.bind(&ctx.gl);
        res.shader
            .set_f32(&ctx.gl, "u_time", self.elapsed.as_secs_f32());
        res.mesh.draw(&ctx.gl);
    }

    fn resize(&mut self, _: &Context, _: u32, _: u32) -> Out {
        Out::Empty
    }

    fn exit(&mut self, ctx: &Context) {
        if let Some(res) = self.resources.take() {
            res.mesh.delete(&ctx.gl);
            res.shader.delete(&ctx.gl);
        }
    }
}
