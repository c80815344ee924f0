//! Ties the modules, the frame clock and a backend into the frame loop.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use image::RgbaImage;
use tracing::{debug, info};

use birdview_feed::Waypoint;

use crate::backend::{Backend, InputEvent, PointerState};
use crate::camera::CameraState;
use crate::clock::FrameClock;
use crate::config::ViewerConfig;
use crate::error::Error;
use crate::hud::HudModule;
use crate::input::InputModule;
use crate::module::{FrameContext, ModuleManager};
use crate::render::RenderModule;
use crate::roads::WAYPOINT_SPACING;
use crate::text::TextPainter;
use crate::world::{WorldFeed, WorldModule};
use crate::TARGET_FPS;

/// The assembled viewer: input, render, world and HUD modules around a
/// shared frame context.
pub struct Viewer {
    manager: ModuleManager,
    ctx: FrameContext,
    clock: FrameClock,
    frame: RgbaImage,
    interrupted: Option<Arc<AtomicBool>>,
}

impl Viewer {
    pub fn new(
        config: &ViewerConfig,
        waypoints: &[Waypoint],
        feed: Box<dyn WorldFeed>,
        painter: Box<dyn TextPainter>,
    ) -> Result<Self, Error> {
        let display = (config.width, config.height);
        let mut ctx = FrameContext::new(display);

        let mut manager = ModuleManager::new();
        manager.register(Box::new(InputModule::new()));
        manager.register(Box::new(RenderModule::new(config.antialiasing)));
        manager.register(Box::new(WorldModule::new(display, waypoints, WAYPOINT_SPACING, feed)?));
        manager.register(Box::new(HudModule::new(display, painter)));
        manager.start_all(&mut ctx)?;

        Ok(Viewer {
            manager,
            ctx,
            clock: FrameClock::new(TARGET_FPS),
            frame: RgbaImage::new(display.0, display.1),
            interrupted: None,
        })
    }

    /// Stop the loop once `flag` turns true. Wired to Ctrl-C by the
    /// binary.
    pub fn set_interrupt_flag(&mut self, flag: Arc<AtomicBool>) {
        self.interrupted = Some(flag);
    }

    /// Run a single frame: pace, tick every module with this frame's
    /// input, then composite. Returns the finished frame.
    pub fn run_frame(&mut self, events: Vec<InputEvent>, pointer: PointerState) -> &RgbaImage {
        self.clock.tick();
        self.ctx.client_fps = self.clock.fps();
        self.ctx.begin_frame(events, pointer);
        self.manager.tick_all(&mut self.ctx);
        if let Some(flag) = &self.interrupted {
            if flag.load(Ordering::Relaxed) {
                debug!("interrupted, quitting");
                self.ctx.quit = true;
            }
        }
        self.manager.render_all(&self.ctx, &mut self.frame);
        &self.frame
    }

    pub fn should_quit(&self) -> bool {
        self.ctx.quit
    }

    /// Camera state as of the latest frame.
    pub fn camera(&self) -> &CameraState {
        &self.ctx.camera
    }

    pub fn manager(&self) -> &ModuleManager {
        &self.manager
    }

    fn pump<B: Backend>(&mut self, backend: &mut B) {
        let events = backend.poll_events();
        let pointer = backend.pointer();
        let frame = self.run_frame(events, pointer);
        backend.present(frame);
    }

    /// Drive frames through `backend` until something asks to quit.
    pub fn run<B: Backend>(&mut self, backend: &mut B) {
        info!("viewer loop running");
        while !self.should_quit() {
            self.pump(backend);
        }
        info!("viewer loop finished");
    }

    /// Drive at most `frames` frames, stopping early on quit.
    pub fn run_frames<B: Backend>(&mut self, backend: &mut B, frames: u32) {
        for _ in 0..frames {
            if self.should_quit() {
                break;
            }
            self.pump(backend);
        }
    }

    /// Drop every module, which also disconnects the feed.
    pub fn shutdown(&mut self) {
        debug!("destroying modules");
        self.manager.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use birdview_feed::{ActorState, Location};

    use crate::backend::{HeadlessBackend, Key};
    use crate::module::{MODULE_HUD, MODULE_INPUT, MODULE_RENDER, MODULE_WORLD};
    use crate::text::NullPainter;

    struct StaticFeed(Vec<ActorState>);

    impl WorldFeed for StaticFeed {
        fn start(&mut self) -> Result<(), Error> {
            Ok(())
        }

        fn actors(&self) -> Vec<ActorState> {
            self.0.clone()
        }

        fn server_fps(&self) -> f64 {
            0.0
        }
    }

    fn flat_map() -> Vec<Waypoint> {
        vec![
            Waypoint {
                location: Location { x: 0.0, y: 0.0, z: 0.0 },
                heading: 0.0,
                lane_width: 4.0,
                is_intersection: false,
            },
            Waypoint {
                location: Location { x: 80.0, y: 80.0, z: 0.0 },
                heading: 0.0,
                lane_width: 4.0,
                is_intersection: false,
            },
        ]
    }

    fn viewer() -> Viewer {
        let config = ViewerConfig { width: 120, height: 100, ..Default::default() };
        Viewer::new(&config, &flat_map(), Box::new(StaticFeed(Vec::new())), Box::new(NullPainter))
            .unwrap()
    }

    #[test]
    fn construction_registers_the_standard_modules() {
        let viewer = viewer();
        for name in [MODULE_INPUT, MODULE_RENDER, MODULE_WORLD, MODULE_HUD] {
            assert!(viewer.manager().lookup(name).is_some(), "missing module {name}");
        }
        assert!(!viewer.should_quit());
    }

    #[test]
    fn escape_quits_after_the_frame() {
        let mut viewer = viewer();
        viewer.run_frame(vec![InputEvent::KeyUp(Key::Escape)], PointerState::default());
        assert!(viewer.should_quit());
    }

    #[test]
    fn the_interrupt_flag_stops_the_loop() {
        let mut viewer = viewer();
        let flag = Arc::new(AtomicBool::new(true));
        viewer.set_interrupt_flag(flag);

        let mut backend = HeadlessBackend::new(120, 100);
        viewer.run(&mut backend);
        assert_eq!(backend.frames_presented(), 1);
    }

    #[test]
    fn shutdown_clears_the_modules() {
        let mut viewer = viewer();
        viewer.shutdown();
        assert!(viewer.manager().is_empty());
    }
}
