use gl_sandbox::{config::WindowConfig, flow, states::TexturedQuadState};

fn main() -> anyhow::Result<()> {
    let config = WindowConfig::default().with_title("gl-sandbox: textured quad");
    let state = TexturedQuadState::new("textures/crate.png")
        .with_startup_script("scripts/Greeter.rhai");
    flow::run(config, Box::new(state))
}
