//! Presentation backends: a scripted headless implementation for tests and
//! frame dumps, and a winit/wgpu window behind the `window` feature.

mod headless;

#[cfg(feature = "window")]
mod gpu;
#[cfg(feature = "window")]
mod window;

pub use headless::HeadlessBackend;
#[cfg(feature = "window")]
pub use window::run_windowed;

use image::RgbaImage;

/// Key releases the viewer reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Escape,
    Char(char),
}

/// Mouse buttons, with wheel notches modeled as button presses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    Left,
    Right,
    WheelUp,
    WheelDown,
}

/// Backend-independent input event, drained once per frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    /// The window was asked to close.
    Quit,
    KeyUp(Key),
    MouseButtonDown { button: MouseButton, position: (i32, i32) },
}

/// Pointer snapshot sampled once per frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PointerState {
    pub position: (i32, i32),
    pub left_down: bool,
}

/// Something that can show frames and report input.
pub trait Backend {
    /// Drain the input that arrived since the previous frame.
    fn poll_events(&mut self) -> Vec<InputEvent>;

    fn pointer(&self) -> PointerState;

    fn present(&mut self, frame: &RgbaImage);

    fn size(&self) -> (u32, u32);
}
