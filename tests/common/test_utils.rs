#![allow(dead_code)]

use std::{cell::RefCell, rc::Rc, time::Duration};

use gl_sandbox::{
    HasContext,
    config::WindowConfig,
    context::Context,
    flow::{Out, RenderState},
};

/// Lifecycle calls observed by a [`Recorder`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Call {
    Init,
    Update,
    Draw,
    Resize,
    Exit,
}

pub type CallLog = Rc<RefCell<Vec<Call>>>;

/// What the context looked like right after a state drew a frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub config: WindowConfig,
    /// Clear colour as reported by the driver.
    pub gl_clear_colour: [f32; 4],
    pub gl_error: u32,
}

impl Frame {
    fn capture(ctx: &Context) -> Self {
        let mut gl_clear_colour = [0.0; 4];
        let gl_error = unsafe {
            ctx.gl
                .get_parameter_f32_slice(glow::COLOR_CLEAR_VALUE, &mut gl_clear_colour);
            ctx.gl.get_error()
        };
        Self {
            config: ctx.config.clone(),
            gl_clear_colour,
            gl_error,
        }
    }
}

pub type FrameLog = Rc<RefCell<Vec<Frame>>>;

type InitHook = Box<dyn FnMut(&mut Context) -> anyhow::Result<()>>;
type ConfigureHook = Box<dyn FnOnce(&mut Context)>;

/// A render state that logs every hook and exits after `frames` updates.
pub struct Recorder {
    log: CallLog,
    frames: usize,
    on_init: InitHook,
    configure: Option<ConfigureHook>,
    drawn: FrameLog,
}

impl Recorder {
    pub fn new(log: CallLog, frames: usize) -> Self {
        Self {
            log,
            frames,
            on_init: Box::new(|_| Ok(())),
            configure: None,
            drawn: FrameLog::default(),
        }
    }

    pub fn with_init(mut self, on_init: impl FnMut(&mut Context) -> anyhow::Result<()> + 'static) -> Self {
        self.on_init = Box::new(on_init);
        self
    }

    /// Return `Out::Configure(configure)` from the first update.
    pub fn with_configure(mut self, configure: impl FnOnce(&mut Context) + 'static) -> Self {
        self.configure = Some(Box::new(configure));
        self
    }

    /// Frames captured after every draw.
    pub fn frames(&self) -> FrameLog {
        self.drawn.clone()
    }

    fn updates(&self) -> usize {
        self.log
            .borrow()
            .iter()
            .filter(|&&call| call == Call::Update)
            .count()
    }
}

impl RenderState for Recorder {
    fn init(&mut self, ctx: &mut Context) -> anyhow::Result<()> {
        self.log.borrow_mut().push(Call::Init);
        (self.on_init)(ctx)
    }

    fn update(&mut self, _: &Context, _: Duration) -> Out {
        self.log.borrow_mut().push(Call::Update);
        if self.updates() >= self.frames {
            Out::Exit
        } else if let Some(configure) = self.configure.take() {
            Out::Configure(configure)
        } else {
            Out::Empty
        }
    }

    fn draw(&self, ctx: &Context) {
        self.log.borrow_mut().push(Call::Draw);
        self.drawn.borrow_mut().push(Frame::capture(ctx));
    }

    fn resize(&mut self, _: &Context, _: u32, _: u32) -> Out {
        self.log.borrow_mut().push(Call::Resize);
        Out::Empty
    }

    fn exit(&mut self, _: &Context) {
        self.log.borrow_mut().push(Call::Exit);
    }
}

/// Runs a real render state for `frames` updates, then asks the loop to exit.
/// The wrapped state stays reachable through [`FrameLimit::state`] after
/// `flow::run` has consumed the wrapper.
pub struct FrameLimit<S> {
    state: Rc<RefCell<S>>,
    frames: usize,
    updates: usize,
    exits: Rc<RefCell<usize>>,
    drawn: FrameLog,
}

impl<S: RenderState> FrameLimit<S> {
    pub fn new(state: S, frames: usize) -> Self {
        Self {
            state: Rc::new(RefCell::new(state)),
            frames,
            updates: 0,
            exits: Rc::default(),
            drawn: FrameLog::default(),
        }
    }

    pub fn state(&self) -> Rc<RefCell<S>> {
        self.state.clone()
    }

    pub fn frames(&self) -> FrameLog {
        self.drawn.clone()
    }

    pub fn exits(&self) -> Rc<RefCell<usize>> {
        self.exits.clone()
    }
}

impl<S: RenderState> RenderState for FrameLimit<S> {
    fn init(&mut self, ctx: &mut Context) -> anyhow::Result<()> {
        self.state.borrow_mut().init(ctx)
    }

    fn update(&mut self, ctx: &Context, dt: Duration) -> Out {
        let out = self.state.borrow_mut().update(ctx, dt);
        self.updates += 1;
        if self.updates >= self.frames {
            Out::Exit
        } else {
            out
        }
    }

    fn draw(&self, ctx: &Context) {
        self.state.borrow().draw(ctx);
        self.drawn.borrow_mut().push(Frame::capture(ctx));
    }

    fn resize(&mut self, ctx: &Context, width: u32, height: u32) -> Out {
        self.state.borrow_mut().resize(ctx, width, height)
    }

    fn exit(&mut self, ctx: &Context) {
        *self.exits.borrow_mut() += 1;
        self.state.borrow_mut().exit(ctx);
    }
}

pub fn test_config(title: &str) -> WindowConfig {
    WindowConfig::default()
        .with_title(title)
        .with_size(320, 240)
        .with_vsync(false)
        .with_centered(false)
}
