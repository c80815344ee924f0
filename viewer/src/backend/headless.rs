//! Backend with scripted input and captured output. Drives the frame dump
//! mode and the integration tests.

use std::collections::VecDeque;

use image::RgbaImage;

use super::{Backend, InputEvent, PointerState};

pub struct HeadlessBackend {
    size: (u32, u32),
    events: VecDeque<Vec<InputEvent>>,
    pointer: PointerState,
    last_frame: Option<RgbaImage>,
    frames_presented: usize,
}

impl HeadlessBackend {
    pub fn new(width: u32, height: u32) -> Self {
        HeadlessBackend {
            size: (width, height),
            events: VecDeque::new(),
            pointer: PointerState::default(),
            last_frame: None,
            frames_presented: 0,
        }
    }

    /// Queue the input for one future frame. Each `poll_events` call
    /// consumes one queued batch; an empty queue yields no input.
    pub fn push_events(&mut self, events: Vec<InputEvent>) {
        self.events.push_back(events);
    }

    pub fn set_pointer(&mut self, pointer: PointerState) {
        self.pointer = pointer;
    }

    /// The most recently presented frame, if any.
    pub fn last_frame(&self) -> Option<&RgbaImage> {
        self.last_frame.as_ref()
    }

    pub fn frames_presented(&self) -> usize {
        self.frames_presented
    }
}

impl Backend for HeadlessBackend {
    fn poll_events(&mut self) -> Vec<InputEvent> {
        self.events.pop_front().unwrap_or_default()
    }

    fn pointer(&self) -> PointerState {
        self.pointer
    }

    fn present(&mut self, frame: &RgbaImage) {
        self.frames_presented += 1;
        self.last_frame = Some(frame.clone());
    }

    fn size(&self) -> (u32, u32) {
        self.size
    }
}
