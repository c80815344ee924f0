//! Road network geometry and the static map layer.

use birdview_feed::Waypoint;
use image::RgbaImage;
use tracing::debug;

use crate::drawing::{self, COLOR_DARK_GREY, COLOR_GREY, COLOR_WHITE};
use crate::transform::{MapTransform, ScreenPoint, WorldPoint};

/// Distance between sampled waypoints in meters. Also the length of each
/// drawn lane segment.
pub const WAYPOINT_SPACING: f64 = 2.0;

const BORDER_WIDTH: f32 = 3.0;

/// One lane segment in canvas pixels. Junction segments are drawn without
/// the white border so intersections read as open areas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoadSegment {
    pub start: ScreenPoint,
    pub end: ScreenPoint,
    pub width: i32,
    pub is_intersection: bool,
}

/// Screen-space road geometry plus the lazily rendered base layer.
pub struct RoadMap {
    segments: Vec<RoadSegment>,
    canvas_size: u32,
    layer: Option<RgbaImage>,
}

impl RoadMap {
    /// Project each waypoint into a short segment along its heading.
    pub fn build(waypoints: &[Waypoint], transform: &MapTransform, spacing: f64) -> Self {
        let mut segments = Vec::with_capacity(waypoints.len());
        for waypoint in waypoints {
            let heading = waypoint.heading.to_radians();
            let start = WorldPoint { x: waypoint.location.x, y: waypoint.location.y };
            let end = WorldPoint {
                x: start.x + heading.cos() * spacing,
                y: start.y + heading.sin() * spacing,
            };
            let (width, _) = transform.size_to_screen(waypoint.lane_width, waypoint.lane_width);
            segments.push(RoadSegment {
                start: transform.world_to_screen(start),
                end: transform.world_to_screen(end),
                width,
                is_intersection: waypoint.is_intersection,
            });
        }
        debug!("road map holds {} segments", segments.len());
        RoadMap { segments, canvas_size: transform.canvas_size(), layer: None }
    }

    pub fn segments(&self) -> &[RoadSegment] {
        &self.segments
    }

    /// The rendered base layer, drawing it on first use. The style is
    /// frozen at the first call; later anti-aliasing toggles do not rebuild.
    pub fn layer(&mut self, antialiasing: bool) -> &RgbaImage {
        let segments = &self.segments;
        let canvas_size = self.canvas_size;
        self.layer.get_or_insert_with(|| {
            debug!("rendering road layer: {} segments, antialiasing {antialiasing}", segments.len());
            render_layer(segments, canvas_size, antialiasing)
        })
    }
}

fn render_layer(segments: &[RoadSegment], canvas_size: u32, antialiasing: bool) -> RgbaImage {
    let mut layer = RgbaImage::from_pixel(canvas_size, canvas_size, COLOR_GREY);
    for segment in segments.iter().filter(|segment| !segment.is_intersection) {
        drawing::draw_line_with_border(
            &mut layer,
            (segment.start.x as f32, segment.start.y as f32),
            (segment.end.x as f32, segment.end.y as f32),
            segment.width as f32,
            COLOR_DARK_GREY,
            BORDER_WIDTH,
            COLOR_WHITE,
            antialiasing,
        );
    }
    // Painted after the bordered lanes so junction areas stay open
    for segment in segments.iter().filter(|segment| segment.is_intersection) {
        drawing::draw_line(
            &mut layer,
            (segment.start.x as f32, segment.start.y as f32),
            (segment.end.x as f32, segment.end.y as f32),
            segment.width as f32,
            COLOR_DARK_GREY,
            antialiasing,
        );
    }
    layer
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::WorldBounds;
    use birdview_feed::Location;

    fn transform() -> MapTransform {
        let bounds = WorldBounds {
            min: WorldPoint { x: 0.0, y: 0.0 },
            max: WorldPoint { x: 100.0, y: 100.0 },
        };
        MapTransform::new(bounds, 100).unwrap()
    }

    fn waypoint(x: f64, y: f64, heading: f64, is_intersection: bool) -> Waypoint {
        Waypoint {
            location: Location { x, y, z: 0.0 },
            heading,
            lane_width: 4.0,
            is_intersection,
        }
    }

    #[test]
    fn segments_extend_along_the_heading() {
        let map = RoadMap::build(
            &[waypoint(10.0, 10.0, 0.0, false), waypoint(20.0, 20.0, 90.0, false)],
            &transform(),
            2.0,
        );
        let east = map.segments()[0];
        assert_eq!(east.start, ScreenPoint { x: 10, y: 10 });
        assert_eq!(east.end, ScreenPoint { x: 12, y: 10 });

        let south = map.segments()[1];
        assert_eq!(south.start, ScreenPoint { x: 20, y: 20 });
        // cos(90) is not exactly zero in floating point; x still truncates to 20
        assert_eq!(south.end, ScreenPoint { x: 20, y: 22 });
    }

    #[test]
    fn lane_width_converts_to_pixels() {
        let map = RoadMap::build(&[waypoint(0.0, 0.0, 0.0, false)], &transform(), 2.0);
        assert_eq!(map.segments()[0].width, 4);
    }

    #[test]
    fn junction_flags_are_carried_through() {
        let map = RoadMap::build(
            &[waypoint(0.0, 0.0, 0.0, false), waypoint(4.0, 0.0, 0.0, true)],
            &transform(),
            2.0,
        );
        assert!(!map.segments()[0].is_intersection);
        assert!(map.segments()[1].is_intersection);
    }

    #[test]
    fn the_layer_renders_once_and_keeps_its_style() {
        let mut map = RoadMap::build(&[waypoint(50.0, 50.0, 0.0, false)], &transform(), 2.0);
        let first = map.layer(false).clone();
        // Toggling anti-aliasing afterwards must not rebuild the layer
        let second = map.layer(true);
        assert_eq!(first.as_raw(), second.as_raw());
    }

    #[test]
    fn lanes_are_dark_with_a_white_border() {
        let mut map = RoadMap::build(&[waypoint(50.0, 50.0, 0.0, false)], &transform(), 2.0);
        let layer = map.layer(false);
        // Lane interior
        assert_eq!(*layer.get_pixel(51, 50), COLOR_DARK_GREY);
        // Background is untouched far from the road
        assert_eq!(*layer.get_pixel(10, 10), COLOR_GREY);
        // Border shows up just outside the lane width
        let has_border = (47..=53).any(|y| *layer.get_pixel(51, y) == COLOR_WHITE);
        assert!(has_border);
    }
}
