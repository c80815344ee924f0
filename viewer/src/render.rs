//! Render module: owns the anti-aliasing switch and reports it on the
//! panel. The line rasterizers themselves live in [`crate::drawing`].

use image::RgbaImage;
use tracing::debug;

use crate::hud::PanelItem;
use crate::module::{Command, FrameContext, Module, MODULE_RENDER};

pub struct RenderModule {
    antialiasing: bool,
}

impl RenderModule {
    pub fn new(antialiasing: bool) -> Self {
        RenderModule { antialiasing }
    }
}

impl Module for RenderModule {
    fn name(&self) -> &'static str {
        MODULE_RENDER
    }

    fn start(&mut self, ctx: &mut FrameContext) -> Result<(), crate::Error> {
        ctx.antialiasing = self.antialiasing;
        Ok(())
    }

    fn tick(&mut self, ctx: &mut FrameContext) {
        if ctx.consume(Command::ToggleAntialiasing) {
            ctx.antialiasing = !ctx.antialiasing;
            debug!(antialiasing = ctx.antialiasing, "line style toggled");
        }
        let state = if ctx.antialiasing { "ON" } else { "OFF" };
        ctx.panel.submit(
            MODULE_RENDER,
            vec![PanelItem::Text(format!("Anti-aliasing:           {state:>3}"))],
        );
    }

    fn render(&mut self, _ctx: &FrameContext, _frame: &mut RgbaImage) {}
}
