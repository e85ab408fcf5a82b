#[cfg(feature = "integration-tests")]
mod common;

#[test]
#[cfg(feature = "integration-tests")]
fn should_leave_quad_unloaded_when_startup_script_fails() {
    use std::fs;

    use gl_sandbox::{flow, states::TexturedQuadState};
    use tempfile::TempDir;

    use crate::common::test_utils::{FrameLimit, test_config};

    let dir = TempDir::new().unwrap();
    let script = dir.path().join("Broken.rhai");
    fs::write(&script, r#"fn on_load(title) { throw "no colour for " + title; }"#).unwrap();

    // An absolute path replaces the asset root when joined onto it.
    let quad = TexturedQuadState::new("textures/crate.png")
        .with_startup_script(script.to_string_lossy());
    let state = FrameLimit::new(quad, 4);
    let quad = state.state();
    let frames = state.frames();
    let exits = state.exits();

    let err = flow::run(test_config("broken script"), Box::new(state))
        .expect_err("A throwing startup script must fail init");

    let message = format!("{err:#}");
    assert!(message.contains("calling on_load failed"), "{message}");
    assert!(!quad.borrow().is_loaded());
    assert!(frames.borrow().is_empty());
    assert_eq!(*exits.borrow(), 0);
}
