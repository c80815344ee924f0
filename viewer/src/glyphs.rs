//! Actor shape rendering onto the per-class layers.

use std::collections::HashMap;

use birdview_feed::{ActorState, SignalState};
use image::{Rgba, RgbaImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_filled_rect_mut};
use imageproc::rect::Rect;

use crate::drawing::{self, COLOR_BLUE, COLOR_GREEN, COLOR_LIGHT_GREY, COLOR_RED, COLOR_YELLOW};
use crate::transform::{MapTransform, WorldPoint};

const ARROW_WIDTH: f32 = 2.0;

/// Color for a traffic light phase. Off, unknown or missing phases get a
/// visible neutral instead of failing.
fn signal_color(signal: Option<SignalState>) -> Rgba<u8> {
    match signal {
        Some(SignalState::Green) => COLOR_GREEN,
        Some(SignalState::Yellow) => COLOR_YELLOW,
        Some(SignalState::Red) => COLOR_RED,
        _ => COLOR_LIGHT_GREY,
    }
}

/// A vehicle seen from above: a filled box with a heading arrow pointing
/// along +X. At least one pixel per axis so distant vehicles stay visible.
fn vehicle_glyph(width: u32, height: u32, color: Rgba<u8>) -> RgbaImage {
    let mut glyph = RgbaImage::new(width, height);
    draw_filled_rect_mut(&mut glyph, Rect::at(0, 0).of_size(width, height), color);

    let w = width as f32;
    let h = height as f32;
    let center = (w / 2.0, h / 2.0);
    let tip = (w - 1.0, h / 2.0);
    let head_x = h / 2.0 + w / 2.0 - 1.0;
    drawing::draw_thick_line(&mut glyph, center, tip, ARROW_WIDTH, COLOR_BLUE);
    drawing::draw_thick_line(&mut glyph, tip, (head_x, 0.0), ARROW_WIDTH, COLOR_BLUE);
    drawing::draw_thick_line(&mut glyph, tip, (head_x, h), ARROW_WIDTH, COLOR_BLUE);
    glyph
}

/// Draws actor groups, caching vehicle glyphs by their pixel size.
pub struct ShapeRenderer {
    vehicle_glyphs: HashMap<(u32, u32, [u8; 4]), RgbaImage>,
}

impl ShapeRenderer {
    pub fn new() -> Self {
        ShapeRenderer { vehicle_glyphs: HashMap::new() }
    }

    /// Oriented boxes, rotated by each vehicle's heading about its center.
    pub fn draw_vehicles(
        &mut self,
        layer: &mut RgbaImage,
        vehicles: &[ActorState],
        color: Rgba<u8>,
        transform: &MapTransform,
    ) {
        for actor in vehicles {
            let (w, h) = transform.size_to_screen(actor.extent.x * 2.0, actor.extent.y * 2.0);
            let width = w.max(1) as u32;
            let height = h.max(1) as u32;
            let glyph = self
                .vehicle_glyphs
                .entry((width, height, color.0))
                .or_insert_with(|| vehicle_glyph(width, height, color));
            let screen = transform
                .world_to_screen(WorldPoint { x: actor.location.x, y: actor.location.y });
            drawing::blit_rotated(layer, glyph, screen.x, screen.y, actor.heading.to_radians() as f32);
        }
    }

    /// Discs colored by the current phase.
    pub fn draw_traffic_lights(
        &self,
        layer: &mut RgbaImage,
        lights: &[ActorState],
        radius: i32,
        transform: &MapTransform,
    ) {
        for actor in lights {
            let screen = transform
                .world_to_screen(WorldPoint { x: actor.location.x, y: actor.location.y });
            draw_filled_circle_mut(layer, (screen.x, screen.y), radius, signal_color(actor.signal));
        }
    }

    /// Fixed-color discs for speed limit signs and walkers.
    pub fn draw_discs(
        &self,
        layer: &mut RgbaImage,
        actors: &[ActorState],
        color: Rgba<u8>,
        radius: i32,
        transform: &MapTransform,
    ) {
        for actor in actors {
            let screen = transform
                .world_to_screen(WorldPoint { x: actor.location.x, y: actor.location.y });
            draw_filled_circle_mut(layer, (screen.x, screen.y), radius, color);
        }
    }
}

impl Default for ShapeRenderer {
    fn default() -> Self {
        Self::new()
    }
}
