pub mod actor;
pub mod backend;
pub mod camera;
pub mod clock;
pub mod config;
pub mod drawing;
mod error;
pub mod glyphs;
pub mod hud;
pub mod input;
pub mod live;
pub mod module;
pub mod render;
pub mod roads;
pub mod text;
pub mod transform;
pub mod viewer;
pub mod world;

/// Width of the translucent info panel along the left edge, in pixels.
pub const PANEL_WIDTH: u32 = 240;

/// Target frame rate of the viewer loop.
pub const TARGET_FPS: u32 = 60;

/// World-space radius in meters around the hero inside which vehicles,
/// traffic lights and speed limit signs are drawn while following.
pub const FILTER_RADIUS: f64 = 50.0;

pub use config::ViewerConfig;
pub use error::Error;
pub use module::{FrameContext, Module, ModuleManager};
pub use transform::{MapTransform, WorldBounds};
pub use viewer::Viewer;
