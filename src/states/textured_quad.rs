use std::time::Duration;

use cgmath::{Deg, Matrix4, ortho};
use rhai::Dynamic;

use crate::{
    context::Context,
    data_structures::{
        mesh::{Mesh, VertexLayout},
        shader::Shader,
        texture::Texture,
    },
    flow::{Out, RenderState},
    resources::{self, texture::load_texture_or_checkerboard},
    script::ScriptCompiler,
};

// Position (xyz), texture coordinates (uv).
#[rustfmt::skip]
const VERTICES: [f32; 20] = [
     0.5,  0.5, 0.0,   1.0, 1.0,
     0.5, -0.5, 0.0,   1.0, 0.0,
    -0.5, -0.5, 0.0,   0.0, 0.0,
    -0.5,  0.5, 0.0,   0.0, 1.0,
];

#[rustfmt::skip]
const INDICES: [u32; 6] = [
    0, 1, 3,
    1, 2, 3,
];

const TEXTURE_UNIT: u32 = 0;
const DEGREES_PER_SECOND: f32 = 20.0;

struct Resources {
    shader: Shader,
    mesh: Mesh,
    texture: Texture,
}

/// A textured quad drawn through an element buffer. On load it compiles and
/// runs its startup script, whose result may pick the clear colour.
pub struct TexturedQuadState {
    texture_file: String,
    script_file: Option<String>,
    resources: Option<Resources>,
    elapsed: Duration,
    aspect: f32,
}

impl TexturedQuadState {
    pub fn new(texture_file: impl Into<String>) -> Self {
        Self {
            texture_file: texture_file.into(),
            script_file: None,
            resources: None,
            elapsed: Duration::ZERO,
            aspect: 1.0,
        }
    }

    /// Run `on_load(title)` from this script (relative to the asset root)
    /// during `init`.
    pub fn with_startup_script(mut self, script_file: impl Into<String>) -> Self {
        self.script_file = Some(script_file.into());
        self
    }

    fn run_startup_script(&self, ctx: &mut Context) -> anyhow::Result<()> {
        let Some(script_file) = &self.script_file else {
            return Ok(());
        };
        let path = resources::asset_path(script_file);
        if !path.exists() {
            log::info!("No startup script at {}", path.display());
            return Ok(());
        }

        let compiler = ScriptCompiler::new();
        let type_name = ScriptCompiler::default_type_name(&path);
        let title: Dynamic = ctx.config.title.clone().into();
        let result =
            compiler.compile_and_invoke(&path, "on_load", type_name.as_deref(), vec![title])?;
        match result.as_ref().and_then(colour_from_dynamic) {
            Some(colour) => {
                log::info!("Startup script picked clear colour {colour:?}");
                ctx.config.clear_colour = colour;
            }
            None => log::debug!("Startup script returned {result:?}"),
        }
        Ok(())
    }

    /// True between a successful `init` and `exit`.
    pub fn is_loaded(&self) -> bool {
        self.resources.is_some()
    }

    fn transform(&self) -> Matrix4<f32> {
        let aspect = self.aspect.max(f32::EPSILON);
        let projection = ortho(-aspect, aspect, -1.0, 1.0, -1.0, 1.0);
        let angle = Deg(self.elapsed.as_secs_f32() * DEGREES_PER_SECOND);
        projection * Matrix4::from_angle_z(angle)
    }
}

impl RenderState for TexturedQuadState {
    fn init(&mut self, ctx: &mut Context) -> anyhow::Result<()> {
        // No GPU objects exist yet: a failing init never gets an exit call.
        self.run_startup_script(ctx)?;

        let gl = &ctx.gl;
        let shader = resources::load_shader(gl, "textured")?;
        let mesh = match Mesh::new(gl, &VERTICES, Some(&INDICES), &VertexLayout::new(&[3, 2])) {
            Ok(mesh) => mesh,
            Err(e) => {
                shader.delete(gl);
                return Err(e);
            }
        };
        let texture = match load_texture_or_checkerboard(gl, &self.texture_file) {
            Ok(texture) => texture,
            Err(e) => {
                mesh.delete(gl);
                shader.delete(gl);
                return Err(e);
            }
        };

        shader.bind(gl);
        shader.set_i32(gl, "u_texture", TEXTURE_UNIT as i32);
        self.resources = Some(Resources {
            shader,
            mesh,
            texture,
        });
        Ok(())
    }

    fn update(&mut self, _: &Context, dt: Duration) -> Out {
        self.elapsed += dt;
        Out::Empty
    }

    fn draw(&self, ctx: &Context) {
        let Some(res) = &self.resources else { return };
        if let Err(e) = res.texture.bind(&ctx.gl, TEXTURE_UNIT) {
            log::error!("{e:#}");
            return;
        }
        res.shader.bind(&ctx.gl);
        res.shader.set_mat4(&ctx.gl, "u_transform", &self.transform());
        res.mesh.draw(&ctx.gl);
    }

    fn resize(&mut self, ctx: &Context, _: u32, _: u32) -> Out {
        self.aspect = ctx.aspect_ratio();
        Out::Empty
    }

    fn exit(&mut self, ctx: &Context) {
        if let Some(res) = self.resources.take() {
            res.texture.delete(&ctx.gl);
            res.mesh.delete(&ctx.gl);
            res.shader.delete(&ctx.gl);
        }
    }
}

/// Accepts `[r, g, b]` or `[r, g, b, a]` with float or integer components.
fn colour_from_dynamic(value: &Dynamic) -> Option<[f32; 4]> {
    let array = value.clone().into_array().ok()?;
    if !(3..=4).contains(&array.len()) {
        return None;
    }
    let mut colour = [1.0; 4];
    for (slot, component) in colour.iter_mut().zip(&array) {
        let component = component
            .as_float()
            .or_else(|_| component.as_int().map(|i| i as f64))
            .ok()?;
        *slot = (component as f32).clamp(0.0, 1.0);
    }
    Some(colour)
}
