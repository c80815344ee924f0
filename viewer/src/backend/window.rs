//! Winit event loop driving the viewer and presenting frames through wgpu.

use std::sync::Arc;

use tracing::{debug, warn};
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{Key as LogicalKey, NamedKey};
use winit::window::{Window, WindowId};

use super::gpu::GpuState;
use super::{InputEvent, Key, MouseButton, PointerState};
use crate::error::Error;
use crate::viewer::Viewer;

struct ViewerApp {
    viewer: Viewer,
    size: (u32, u32),
    gpu: Option<GpuState>,
    events: Vec<InputEvent>,
    pointer: PointerState,
}

impl ApplicationHandler for ViewerApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.gpu.is_some() {
            return;
        }
        let attributes = Window::default_attributes()
            .with_title("birdview")
            .with_inner_size(PhysicalSize::new(self.size.0, self.size.1))
            .with_resizable(false);
        let window = match event_loop.create_window(attributes) {
            Ok(window) => Arc::new(window),
            Err(err) => {
                warn!("could not open a window: {err}");
                event_loop.exit();
                return;
            }
        };
        match pollster::block_on(GpuState::new(window, self.size.0, self.size.1)) {
            Ok(gpu) => {
                gpu.window().request_redraw();
                self.gpu = Some(gpu);
            }
            Err(err) => {
                warn!("could not initialize graphics: {err}");
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                self.events.push(InputEvent::Quit);
            }
            WindowEvent::Resized(size) => {
                if let Some(gpu) = self.gpu.as_mut() {
                    gpu.resize(size.width, size.height);
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.pointer.position = (position.x as i32, position.y as i32);
            }
            WindowEvent::MouseInput { state, button, .. } => {
                if button == winit::event::MouseButton::Left {
                    self.pointer.left_down = state == ElementState::Pressed;
                }
                if state == ElementState::Pressed {
                    let button = match button {
                        winit::event::MouseButton::Left => Some(MouseButton::Left),
                        winit::event::MouseButton::Right => Some(MouseButton::Right),
                        _ => None,
                    };
                    if let Some(button) = button {
                        self.events.push(InputEvent::MouseButtonDown {
                            button,
                            position: self.pointer.position,
                        });
                    }
                }
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let notches = match delta {
                    MouseScrollDelta::LineDelta(_, y) => f64::from(y),
                    MouseScrollDelta::PixelDelta(position) => position.y,
                };
                if notches != 0.0 {
                    let button =
                        if notches > 0.0 { MouseButton::WheelUp } else { MouseButton::WheelDown };
                    self.events.push(InputEvent::MouseButtonDown {
                        button,
                        position: self.pointer.position,
                    });
                }
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if event.state != ElementState::Released {
                    return;
                }
                match event.logical_key {
                    LogicalKey::Named(NamedKey::Escape) => {
                        self.events.push(InputEvent::KeyUp(Key::Escape));
                    }
                    LogicalKey::Character(text) => {
                        if let Some(ch) = text.chars().next() {
                            self.events.push(InputEvent::KeyUp(Key::Char(ch.to_ascii_lowercase())));
                        }
                    }
                    _ => {}
                }
            }
            WindowEvent::RedrawRequested => {
                let events = std::mem::take(&mut self.events);
                let frame = self.viewer.run_frame(events, self.pointer);
                if let Some(gpu) = self.gpu.as_ref() {
                    gpu.upload(frame);
                    gpu.present();
                }
                if self.viewer.should_quit() {
                    event_loop.exit();
                    return;
                }
                if let Some(gpu) = self.gpu.as_ref() {
                    gpu.window().request_redraw();
                }
            }
            _ => {}
        }
    }
}

/// Open a window sized to the configured resolution and run the viewer
/// until it asks to quit or the window closes.
pub fn run_windowed(viewer: Viewer, width: u32, height: u32) -> Result<(), Error> {
    let event_loop = EventLoop::new().map_err(|err| Error::Backend(err.to_string()))?;
    event_loop.set_control_flow(ControlFlow::Poll);
    let mut app = ViewerApp {
        viewer,
        size: (width, height),
        gpu: None,
        events: Vec::new(),
        pointer: PointerState::default(),
    };
    event_loop.run_app(&mut app).map_err(|err| Error::Backend(err.to_string()))?;
    debug!("window closed");
    app.viewer.shutdown();
    Ok(())
}
