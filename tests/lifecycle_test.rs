#[cfg(feature = "integration-tests")]
mod common;

#[test]
#[cfg(feature = "integration-tests")]
fn should_drive_hooks_in_order_and_exit_once() {
    use std::{cell::RefCell, rc::Rc};

    use gl_sandbox::flow;

    use crate::common::test_utils::{Call, Recorder, test_config};

    let log = Rc::new(RefCell::new(Vec::new()));
    let state = Recorder::new(log.clone(), 3);

    flow::run(test_config("lifecycle"), Box::new(state)).unwrap();

    let calls = log.borrow();
    assert_eq!(calls.first(), Some(&Call::Init));
    assert_eq!(calls.last(), Some(&Call::Exit));
    assert_eq!(calls.iter().filter(|&&c| c == Call::Exit).count(), 1);
    assert_eq!(calls.iter().filter(|&&c| c == Call::Update).count(), 3);

    // Every draw is preceded by the update of the same frame.
    let first_update = calls.iter().position(|&c| c == Call::Update).unwrap();
    let first_draw = calls.iter().position(|&c| c == Call::Draw).unwrap();
    assert!(first_update < first_draw);
    // The exiting frame is not drawn.
    assert_eq!(calls.iter().filter(|&&c| c == Call::Draw).count(), 2);
}
