#[cfg(feature = "integration-tests")]
mod common;

#[test]
#[cfg(feature = "integration-tests")]
fn should_apply_configure_output_to_context() {
    use std::{cell::RefCell, rc::Rc};

    use gl_sandbox::flow;

    use crate::common::test_utils::{Recorder, test_config};

    const COLOUR: [f32; 4] = [0.5, 0.25, 0.75, 1.0];

    let log = Rc::new(RefCell::new(Vec::new()));
    let state = Recorder::new(log, 3).with_configure(|ctx| {
        ctx.set_title("configured");
        ctx.config.clear_colour = COLOUR;
    });
    let frames = state.frames();

    flow::run(test_config("configure"), Box::new(state)).unwrap();

    let frames = frames.borrow();
    // Configure is returned from the first update, before that frame is drawn.
    assert_eq!(frames.len(), 2);
    for frame in frames.iter() {
        assert_eq!(frame.config.title, "configured");
        assert_eq!(frame.config.clear_colour, COLOUR);
        assert_eq!(frame.gl_clear_colour, COLOUR);
    }
}
