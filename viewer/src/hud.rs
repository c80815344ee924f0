//! Info panel, legend and actor id labels, composited over the map as the
//! last module in render order.

use image::{Rgba, RgbaImage};
use imageproc::drawing::draw_hollow_rect_mut;
use imageproc::rect::Rect;
use tracing::debug;

use birdview_feed::ActorId;

use crate::drawing::{
    draw_thick_line, fill_rect_blend, COLOR_BLUE, COLOR_LIGHT_GREY, COLOR_MAGENTA, COLOR_WHITE,
};
use crate::module::{Command, FrameContext, Module, MODULE_HUD};
use crate::text::TextPainter;
use crate::transform::ScreenPoint;
use crate::PANEL_WIDTH;

const LEGEND_NAME: &str = "LEGEND";
const VEHICLE_NAME: &str = "Vehicle";
const SPEED_LIMIT_NAME: &str = "Speed Limit";
const WALKER_NAME: &str = "Walker";

const FONT_SIZE: f32 = 14.0;
const ROW_HEIGHT: i32 = 18;
const BAR_H_OFFSET: i32 = 100;
const BAR_WIDTH: i32 = 106;
const SWATCH_SIZE: i32 = 25;
const PANEL_ALPHA: u8 = 100;
const LABEL_ALPHA: u8 = 150;
const GRAPH_COLOR: Rgba<u8> = Rgba([255, 136, 0, 255]);

/// A single panel row.
#[derive(Debug, Clone, PartialEq)]
pub enum PanelItem {
    Text(String),
    /// Labeled progress bar; `value` is normalized over `[min, max]`.
    /// Ranges with a negative minimum render as a slider knob instead of
    /// a left-anchored fill.
    Bar {
        label: String,
        value: f64,
        min: f64,
        max: f64,
    },
    /// Labeled boolean square, filled when true.
    Flag { label: String, value: bool },
    /// Polyline sparkline over values in `[0, 1]`, one point per entry.
    Graph(Vec<f64>),
}

/// One frame's worth of panel submissions. Blocks keep their first-seen
/// position; resubmitting under the same name replaces the items in place.
#[derive(Debug, Clone, Default)]
pub struct PanelFrame {
    blocks: Vec<(String, Vec<PanelItem>)>,
}

impl PanelFrame {
    pub fn submit(&mut self, name: &str, items: Vec<PanelItem>) {
        if let Some(block) = self.blocks.iter_mut().find(|(existing, _)| existing == name) {
            block.1 = items;
        } else {
            self.blocks.push((name.to_string(), items));
        }
    }

    pub fn clear(&mut self) {
        self.blocks.clear();
    }

    pub fn blocks(&self) -> &[(String, Vec<PanelItem>)] {
        &self.blocks
    }

    pub fn get(&self, name: &str) -> Option<&[PanelItem]> {
        self.blocks
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, items)| items.as_slice())
    }
}

/// Screen-space id label published by the world module, already offset by
/// the camera.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActorLabel {
    pub id: ActorId,
    pub position: ScreenPoint,
}

struct Legend {
    entries: Vec<(Rgba<u8>, &'static str)>,
}

impl Legend {
    fn new() -> Self {
        Legend {
            entries: vec![
                (COLOR_MAGENTA, VEHICLE_NAME),
                (COLOR_BLUE, SPEED_LIMIT_NAME),
                (COLOR_WHITE, WALKER_NAME),
            ],
        }
    }

    fn render(&self, painter: &dyn TextPainter, frame: &mut RgbaImage) {
        let h_offset = 20;
        let h_space = 10;
        let mut v_offset = 235;

        painter.draw_text(frame, 8 + 50, v_offset, FONT_SIZE, COLOR_LIGHT_GREY, LEGEND_NAME);
        for (color, name) in &self.entries {
            v_offset += SWATCH_SIZE + 10;
            fill_rect_blend(frame, h_offset, v_offset, SWATCH_SIZE, SWATCH_SIZE, *color);
            painter.draw_text(
                frame,
                SWATCH_SIZE + h_offset + h_space,
                v_offset + 5,
                FONT_SIZE,
                COLOR_LIGHT_GREY,
                name,
            );
        }
    }
}

pub struct HudModule {
    painter: Box<dyn TextPainter>,
    show_info: bool,
    display: (u32, u32),
    legend: Legend,
}

impl HudModule {
    pub fn new(display: (u32, u32), painter: Box<dyn TextPainter>) -> Self {
        HudModule { painter, show_info: true, display, legend: Legend::new() }
    }

    fn render_panel(&self, ctx: &FrameContext, frame: &mut RgbaImage) {
        let height = self.display.1 as i32;
        fill_rect_blend(frame, 0, 0, PANEL_WIDTH as i32, height, Rgba([0, 0, 0, PANEL_ALPHA]));

        let mut v_offset = 4;
        let mut i = 0;
        for (name, items) in ctx.panel.blocks() {
            self.painter.draw_text(
                frame,
                8 + BAR_WIDTH / 2,
                ROW_HEIGHT * i + v_offset,
                FONT_SIZE,
                COLOR_LIGHT_GREY,
                name,
            );
            i += 1;
            for item in items {
                if v_offset + ROW_HEIGHT > height {
                    break;
                }
                let label = match item {
                    PanelItem::Graph(values) => {
                        if values.len() > 1 {
                            let points: Vec<(f32, f32)> = values
                                .iter()
                                .enumerate()
                                .map(|(x, y)| {
                                    (
                                        (x as i32 + 8) as f32,
                                        (v_offset + 8) as f32 + ((1.0 - y) * 30.0) as f32,
                                    )
                                })
                                .collect();
                            for pair in points.windows(2) {
                                draw_thick_line(frame, pair[0], pair[1], 2.0, GRAPH_COLOR);
                            }
                        }
                        None
                    }
                    PanelItem::Flag { label, value } => {
                        let square = Rect::at(BAR_H_OFFSET, v_offset + 8).of_size(6, 6);
                        if *value {
                            fill_rect_blend(frame, BAR_H_OFFSET, v_offset + 8, 6, 6, COLOR_WHITE);
                        } else {
                            draw_hollow_rect_mut(frame, square, COLOR_WHITE);
                        }
                        Some(label.as_str())
                    }
                    PanelItem::Bar { label, value, min, max } => {
                        let border =
                            Rect::at(BAR_H_OFFSET, v_offset + 8).of_size(BAR_WIDTH as u32, 6);
                        draw_hollow_rect_mut(frame, border, COLOR_WHITE);
                        let span = max - min;
                        let f = if span.abs() < f64::EPSILON {
                            0.0
                        } else {
                            ((value - min) / span).clamp(0.0, 1.0)
                        };
                        if *min < 0.0 {
                            let knob = BAR_H_OFFSET + (f * (BAR_WIDTH - 6) as f64) as i32;
                            fill_rect_blend(frame, knob, v_offset + 8, 6, 6, COLOR_WHITE);
                        } else {
                            let fill = (f * BAR_WIDTH as f64) as i32;
                            if fill > 0 {
                                fill_rect_blend(frame, BAR_H_OFFSET, v_offset + 8, fill, 6, COLOR_WHITE);
                            }
                        }
                        Some(label.as_str())
                    }
                    PanelItem::Text(line) => Some(line.as_str()),
                };
                if let Some(label) = label {
                    if !label.is_empty() {
                        self.painter.draw_text(
                            frame,
                            8,
                            ROW_HEIGHT * i + v_offset,
                            FONT_SIZE,
                            COLOR_WHITE,
                            label,
                        );
                    }
                }
                v_offset += ROW_HEIGHT;
            }
        }
    }

    fn render_labels(&self, ctx: &FrameContext, frame: &mut RgbaImage) {
        for label in &ctx.labels {
            let text = label.id.to_string();
            let backing = text.len() as i32 * 8;
            fill_rect_blend(
                frame,
                label.position.x,
                label.position.y,
                backing,
                14,
                Rgba([0, 0, 0, LABEL_ALPHA]),
            );
            self.painter.draw_text(
                frame,
                label.position.x,
                label.position.y,
                FONT_SIZE,
                COLOR_LIGHT_GREY,
                &text,
            );
        }
    }
}

impl Module for HudModule {
    fn name(&self) -> &'static str {
        MODULE_HUD
    }

    fn tick(&mut self, ctx: &mut FrameContext) {
        if ctx.consume(Command::TogglePanel) {
            self.show_info = !self.show_info;
            debug!(visible = self.show_info, "info panel toggled");
        }
    }

    fn render(&mut self, ctx: &FrameContext, frame: &mut RgbaImage) {
        if !self.show_info {
            return;
        }
        self.render_panel(ctx, frame);
        self.legend.render(self.painter.as_ref(), frame);
        self.render_labels(ctx, frame);
    }
}
