use gl_sandbox::{config::WindowConfig, flow, states::TriangleState};

fn main() -> anyhow::Result<()> {
    let config = WindowConfig::default().with_title("gl-sandbox: triangle");
    flow::run(config, Box::new(TriangleState::new()))
}
