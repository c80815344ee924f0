//! World-to-canvas projection.
//!
//! The map is drawn onto a square canvas whose side is the smaller window
//! dimension. Each world axis is normalized against the bounds
//! independently, so a non-square world stretches to fit the canvas.

use crate::error::Error;

/// A point in simulator world space, meters.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct WorldPoint {
    pub x: f64,
    pub y: f64,
}

/// A pixel position on the map canvas, (0, 0) at the top left.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScreenPoint {
    pub x: i32,
    pub y: i32,
}

/// Axis-aligned bounding box of the drivable world.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorldBounds {
    pub min: WorldPoint,
    pub max: WorldPoint,
}

impl WorldBounds {
    /// Smallest box containing every point. Fails when the input is empty
    /// or collapses to a line or point on either axis.
    pub fn from_points<I>(points: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item = WorldPoint>,
    {
        let mut min = WorldPoint { x: f64::INFINITY, y: f64::INFINITY };
        let mut max = WorldPoint { x: f64::NEG_INFINITY, y: f64::NEG_INFINITY };
        for point in points {
            min.x = min.x.min(point.x);
            min.y = min.y.min(point.y);
            max.x = max.x.max(point.x);
            max.y = max.y.max(point.y);
        }
        WorldBounds { min, max }.validated()
    }

    fn validated(self) -> Result<Self, Error> {
        if self.max.x > self.min.x && self.max.y > self.min.y {
            Ok(self)
        } else {
            Err(Error::DegenerateBounds { min: self.min, max: self.max })
        }
    }

    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }
}

/// Projects world positions and sizes onto the map canvas.
#[derive(Debug, Clone, Copy)]
pub struct MapTransform {
    bounds: WorldBounds,
    canvas_size: u32,
}

impl MapTransform {
    /// Fails when the bounds collapse on either axis; `WorldBounds` fields
    /// are public, so hand-built boxes get checked here too.
    pub fn new(bounds: WorldBounds, canvas_size: u32) -> Result<Self, Error> {
        let bounds = bounds.validated()?;
        Ok(MapTransform { bounds, canvas_size })
    }

    pub fn bounds(&self) -> WorldBounds {
        self.bounds
    }

    /// Side of the square canvas in pixels.
    pub fn canvas_size(&self) -> u32 {
        self.canvas_size
    }

    /// Project a world location to canvas pixels, truncating toward zero.
    pub fn world_to_screen(&self, point: WorldPoint) -> ScreenPoint {
        ScreenPoint {
            x: ((point.x - self.bounds.min.x) / self.bounds.width() * self.canvas_size as f64)
                as i32,
            y: ((point.y - self.bounds.min.y) / self.bounds.height() * self.canvas_size as f64)
                as i32,
        }
    }

    /// Convert world-space sizes in meters to pixel sizes per axis.
    pub fn size_to_screen(&self, width: f64, height: f64) -> (i32, i32) {
        (
            (width / self.bounds.width() * self.canvas_size as f64) as i32,
            (height / self.bounds.height() * self.canvas_size as f64) as i32,
        )
    }
}
