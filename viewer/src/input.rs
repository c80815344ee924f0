//! Input module: turns raw backend events into commands, camera motion and
//! the quit flag. Registered first so every other module sees the results
//! in the same frame.

use image::RgbaImage;
use tracing::debug;

use crate::backend::{InputEvent, Key, MouseButton};
use crate::module::{Command, FrameContext, Module, MODULE_INPUT};

#[derive(Default)]
pub struct InputModule {
    /// Drag anchor, reset on every button press.
    mouse_pos: (i32, i32),
}

impl InputModule {
    pub fn new() -> Self {
        InputModule::default()
    }

    fn parse_events(&mut self, ctx: &mut FrameContext) {
        let events = std::mem::take(&mut ctx.events);
        for event in events {
            match event {
                InputEvent::Quit => {
                    debug!("quit requested by the backend");
                    ctx.quit = true;
                }
                InputEvent::KeyUp(Key::Escape) => {
                    debug!("escape released, quitting");
                    ctx.quit = true;
                }
                InputEvent::KeyUp(Key::Char('a')) => {
                    ctx.commands.push(Command::ToggleAntialiasing);
                }
                InputEvent::KeyUp(Key::Char('h')) => {
                    ctx.commands.push(Command::ToggleHero);
                }
                InputEvent::KeyUp(Key::Char('i')) => {
                    ctx.commands.push(Command::TogglePanel);
                }
                InputEvent::KeyUp(Key::Char(_)) => {}
                InputEvent::MouseButtonDown { button, position } => {
                    self.mouse_pos = position;
                    match button {
                        MouseButton::WheelUp => ctx.camera.zoom_in(),
                        MouseButton::WheelDown => ctx.camera.zoom_out(),
                        MouseButton::Left | MouseButton::Right => {}
                    }
                }
            }
        }
    }

    fn parse_mouse(&mut self, ctx: &mut FrameContext) {
        if !ctx.pointer.left_down {
            return;
        }
        let (x, y) = ctx.pointer.position;
        ctx.camera
            .pan_by((x - self.mouse_pos.0) as f64, (y - self.mouse_pos.1) as f64);
        self.mouse_pos = (x, y);
    }
}

impl Module for InputModule {
    fn name(&self) -> &'static str {
        MODULE_INPUT
    }

    fn tick(&mut self, ctx: &mut FrameContext) {
        self.parse_events(ctx);
        self.parse_mouse(ctx);
    }

    fn render(&mut self, _ctx: &FrameContext, _frame: &mut RgbaImage) {}
}
