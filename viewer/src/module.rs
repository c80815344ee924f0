//! The module system: every viewer subsystem implements [`Module`] and is
//! driven by the [`ModuleManager`] in registration order.

use image::RgbaImage;
use tracing::{debug, error};

use crate::backend::{InputEvent, PointerState};
use crate::camera::CameraState;
use crate::drawing::COLOR_BLACK;
use crate::error::Error;
use crate::hud::{ActorLabel, PanelFrame};

pub const MODULE_INPUT: &str = "INPUT";
pub const MODULE_RENDER: &str = "RENDER";
pub const MODULE_WORLD: &str = "WORLD";
pub const MODULE_HUD: &str = "HUD";

/// Commands emitted by the input module during tick and consumed by
/// whichever module owns the matching state later in the same frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    ToggleHero,
    TogglePanel,
    ToggleAntialiasing,
}

/// Per-frame data bus shared by all modules.
///
/// Camera state, the anti-aliasing flag and the quit flag persist across
/// frames; events, commands, panel submissions and labels are reset by
/// [`FrameContext::begin_frame`].
pub struct FrameContext {
    /// Window size in pixels.
    pub display: (u32, u32),
    /// Side of the square map canvas.
    pub canvas_size: u32,
    /// Raw input drained from the backend this frame.
    pub events: Vec<InputEvent>,
    /// Pointer snapshot for this frame.
    pub pointer: PointerState,
    /// High-level commands emitted during tick.
    pub commands: Vec<Command>,
    pub camera: CameraState,
    /// True while anti-aliased line drawing is on.
    pub antialiasing: bool,
    /// Info panel submissions for this frame.
    pub panel: PanelFrame,
    /// Vehicle id labels published by the world module.
    pub labels: Vec<ActorLabel>,
    pub server_fps: f64,
    pub client_fps: f64,
    /// Set when the loop should exit after this frame.
    pub quit: bool,
}

impl FrameContext {
    pub fn new(display: (u32, u32)) -> Self {
        FrameContext {
            display,
            canvas_size: display.0.min(display.1),
            events: Vec::new(),
            pointer: PointerState::default(),
            commands: Vec::new(),
            camera: CameraState::default(),
            antialiasing: true,
            panel: PanelFrame::default(),
            labels: Vec::new(),
            server_fps: 0.0,
            client_fps: 0.0,
            quit: false,
        }
    }

    /// Reset the per-frame fields and install this frame's input.
    pub fn begin_frame(&mut self, events: Vec<InputEvent>, pointer: PointerState) {
        self.events = events;
        self.pointer = pointer;
        self.commands.clear();
        self.panel.clear();
        self.labels.clear();
    }

    /// Remove every pending occurrence of `command`, reporting whether
    /// there was at least one.
    pub fn consume(&mut self, command: Command) -> bool {
        let before = self.commands.len();
        self.commands.retain(|pending| *pending != command);
        self.commands.len() != before
    }
}

/// A viewer subsystem driven by the manager each frame.
pub trait Module {
    /// Stable name used for lookups and panel headers.
    fn name(&self) -> &'static str;

    /// One-shot initialization before the first frame. An error here
    /// aborts startup.
    fn start(&mut self, ctx: &mut FrameContext) -> Result<(), Error> {
        let _ = ctx;
        Ok(())
    }

    /// Per-frame state update, called in registration order.
    fn tick(&mut self, ctx: &mut FrameContext);

    /// Draw onto the frame. Runs after every module has ticked, in
    /// registration order, so later modules draw on top.
    fn render(&mut self, ctx: &FrameContext, frame: &mut RgbaImage);
}

/// Ordered module registry. Registration order is both tick and render
/// order.
#[derive(Default)]
pub struct ModuleManager {
    modules: Vec<Box<dyn Module>>,
}

impl ModuleManager {
    pub fn new() -> Self {
        ModuleManager { modules: Vec::new() }
    }

    pub fn register(&mut self, module: Box<dyn Module>) {
        debug!("registered module {}", module.name());
        self.modules.push(module);
    }

    /// Start every module in registration order, stopping at the first
    /// failure.
    pub fn start_all(&mut self, ctx: &mut FrameContext) -> Result<(), Error> {
        for module in &mut self.modules {
            if let Err(err) = module.start(ctx) {
                error!("module {} failed to start: {err}", module.name());
                return Err(err);
            }
        }
        Ok(())
    }

    pub fn tick_all(&mut self, ctx: &mut FrameContext) {
        for module in &mut self.modules {
            module.tick(ctx);
        }
    }

    /// Clear the frame to black, then let each module draw in order.
    pub fn render_all(&mut self, ctx: &FrameContext, frame: &mut RgbaImage) {
        for pixel in frame.pixels_mut() {
            *pixel = COLOR_BLACK;
        }
        for module in &mut self.modules {
            module.render(ctx, frame);
        }
    }

    /// Find a registered module by name.
    pub fn lookup(&self, name: &str) -> Option<&dyn Module> {
        self.modules
            .iter()
            .find(|module| module.name() == name)
            .map(|module| module.as_ref())
    }

    pub fn clear(&mut self) {
        self.modules.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    struct Recorder {
        name: &'static str,
        log: Rc<RefCell<Vec<String>>>,
        fail_start: bool,
    }

    impl Module for Recorder {
        fn name(&self) -> &'static str {
            self.name
        }

        fn start(&mut self, _ctx: &mut FrameContext) -> Result<(), Error> {
            if self.fail_start {
                return Err(Error::Backend(format!("{} refused to start", self.name)));
            }
            self.log.borrow_mut().push(format!("start {}", self.name));
            Ok(())
        }

        fn tick(&mut self, _ctx: &mut FrameContext) {
            self.log.borrow_mut().push(format!("tick {}", self.name));
        }

        fn render(&mut self, _ctx: &FrameContext, _frame: &mut RgbaImage) {
            self.log.borrow_mut().push(format!("render {}", self.name));
        }
    }

    fn recorder(name: &'static str, log: &Rc<RefCell<Vec<String>>>) -> Box<Recorder> {
        Box::new(Recorder { name, log: log.clone(), fail_start: false })
    }

    #[test]
    fn tick_and_render_follow_registration_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut manager = ModuleManager::new();
        manager.register(recorder("alpha", &log));
        manager.register(recorder("beta", &log));
        manager.register(recorder("gamma", &log));

        let mut ctx = FrameContext::new((64, 64));
        manager.tick_all(&mut ctx);
        let mut frame = RgbaImage::new(64, 64);
        manager.render_all(&ctx, &mut frame);

        assert_eq!(
            *log.borrow(),
            vec![
                "tick alpha",
                "tick beta",
                "tick gamma",
                "render alpha",
                "render beta",
                "render gamma",
            ]
        );
    }

    #[test]
    fn start_all_stops_at_the_first_failure() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut manager = ModuleManager::new();
        manager.register(recorder("alpha", &log));
        manager.register(Box::new(Recorder { name: "beta", log: log.clone(), fail_start: true }));
        manager.register(recorder("gamma", &log));

        let mut ctx = FrameContext::new((64, 64));
        let result = manager.start_all(&mut ctx);
        assert!(matches!(result, Err(Error::Backend(_))));
        // gamma was never started
        assert_eq!(*log.borrow(), vec!["start alpha"]);
    }

    #[test]
    fn lookup_misses_yield_none() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut manager = ModuleManager::new();
        manager.register(recorder("alpha", &log));

        assert!(manager.lookup("alpha").is_some());
        assert!(manager.lookup("missing").is_none());
    }

    #[test]
    fn clear_empties_the_registry() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut manager = ModuleManager::new();
        manager.register(recorder("alpha", &log));
        assert!(!manager.is_empty());
        manager.clear();
        assert!(manager.is_empty());
        assert!(manager.lookup("alpha").is_none());
    }

    #[test]
    fn render_all_clears_the_frame_first() {
        let mut manager = ModuleManager::new();
        let ctx = FrameContext::new((8, 8));
        let mut frame = RgbaImage::from_pixel(8, 8, image::Rgba([9, 9, 9, 9]));
        manager.render_all(&ctx, &mut frame);
        assert!(frame.pixels().all(|pixel| *pixel == COLOR_BLACK));
    }

    #[test]
    fn consume_removes_every_matching_command() {
        let mut ctx = FrameContext::new((64, 64));
        ctx.commands.push(Command::TogglePanel);
        ctx.commands.push(Command::ToggleHero);
        ctx.commands.push(Command::TogglePanel);

        assert!(ctx.consume(Command::TogglePanel));
        assert!(!ctx.consume(Command::TogglePanel));
        assert!(ctx.consume(Command::ToggleHero));
        assert!(ctx.commands.is_empty());
    }
}
