//! Camera state: pan, zoom and the follow target.

use birdview_feed::{ActorId, ActorState, Location};

use crate::transform::ScreenPoint;

/// Wheel zoom step per notch.
pub const ZOOM_STEP: f64 = 0.1;
/// Smallest allowed zoom factor.
pub const ZOOM_FLOOR: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraMode {
    Free,
    Follow(ActorId),
}

/// Pan and zoom state persisted across frames.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraState {
    pub mode: CameraMode,
    /// Accumulated drag offset in pixels, free mode only.
    pub pan: (f64, f64),
    /// Wheel zoom factor per axis. Tracked and clamped here; compositing
    /// is currently translation only.
    pub zoom: (f64, f64),
}

impl Default for CameraState {
    fn default() -> Self {
        CameraState { mode: CameraMode::Free, pan: (0.0, 0.0), zoom: (1.0, 1.0) }
    }
}

impl CameraState {
    pub fn zoom_in(&mut self) {
        self.zoom.0 += ZOOM_STEP;
        self.zoom.1 += ZOOM_STEP;
    }

    pub fn zoom_out(&mut self) {
        self.zoom.0 -= ZOOM_STEP;
        self.zoom.1 -= ZOOM_STEP;
        if self.zoom.0 <= ZOOM_FLOOR {
            self.zoom.0 = ZOOM_FLOOR;
        }
        if self.zoom.1 <= ZOOM_FLOOR {
            self.zoom.1 = ZOOM_FLOOR;
        }
    }

    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        self.pan.0 += dx;
        self.pan.1 += dy;
    }
}

/// Screen translation applied to the world layers this frame.
///
/// Free mode centers the canvas horizontally and applies the drag offset;
/// follow mode puts the hero's screen position exactly at the display
/// center.
pub fn view_offset(
    camera: &CameraState,
    display: (u32, u32),
    canvas_size: u32,
    hero_screen: Option<ScreenPoint>,
) -> (i32, i32) {
    match hero_screen {
        Some(hero) => (
            display.0 as i32 / 2 - hero.x,
            display.1 as i32 / 2 - hero.y,
        ),
        None => (
            (display.0 as i32 - canvas_size as i32) / 2 + camera.pan.0 as i32,
            camera.pan.1 as i32,
        ),
    }
}

/// True when `actor` lies within `radius` meters of `center` in the
/// ground plane, boundary inclusive.
pub fn within_radius(center: &Location, actor: &ActorState, radius: f64) -> bool {
    let dx = actor.location.x - center.x;
    let dy = actor.location.y - center.y;
    (dx * dx + dy * dy).sqrt() <= radius
}

#[cfg(test)]
mod tests {
    use super::*;

    fn actor_at(x: f64, y: f64) -> ActorState {
        ActorState {
            id: ActorId(1),
            type_id: "vehicle.audi.tt".to_string(),
            location: Location { x, y, z: 0.0 },
            heading: 0.0,
            velocity: Default::default(),
            extent: Default::default(),
            signal: None,
        }
    }

    #[test]
    fn zoom_never_falls_below_the_floor() {
        let mut camera = CameraState::default();
        for _ in 0..20 {
            camera.zoom_out();
        }
        assert_eq!(camera.zoom, (ZOOM_FLOOR, ZOOM_FLOOR));
        camera.zoom_in();
        assert!(camera.zoom.0 > ZOOM_FLOOR);
    }

    #[test]
    fn pan_accumulates_across_drags() {
        let mut camera = CameraState::default();
        camera.pan_by(5.0, -3.0);
        camera.pan_by(2.0, 1.0);
        assert_eq!(camera.pan, (7.0, -2.0));
    }

    #[test]
    fn free_mode_centers_the_canvas_horizontally() {
        let camera = CameraState::default();
        let offset = view_offset(&camera, (1280, 720), 720, None);
        assert_eq!(offset, ((1280 - 720) / 2, 0));
    }

    #[test]
    fn free_mode_applies_the_drag_offset() {
        let mut camera = CameraState::default();
        camera.pan_by(-40.0, 25.0);
        let offset = view_offset(&camera, (1280, 720), 720, None);
        assert_eq!(offset, (280 - 40, 25));
    }

    #[test]
    fn follow_mode_pins_the_hero_to_the_display_center() {
        let camera = CameraState {
            mode: CameraMode::Follow(ActorId(9)),
            ..Default::default()
        };
        let hero = ScreenPoint { x: 213, y: 587 };
        let (ox, oy) = view_offset(&camera, (800, 600), 600, Some(hero));
        assert_eq!((hero.x + ox, hero.y + oy), (400, 300));
    }

    #[test]
    fn the_filter_boundary_is_inclusive() {
        let center = Location { x: 0.0, y: 0.0, z: 0.0 };
        assert!(within_radius(&center, &actor_at(50.0, 0.0), 50.0));
        assert!(within_radius(&center, &actor_at(30.0, 40.0), 50.0));
        assert!(!within_radius(&center, &actor_at(50.001, 0.0), 50.0));
    }

    #[test]
    fn altitude_does_not_affect_the_filter() {
        let center = Location { x: 0.0, y: 0.0, z: 0.0 };
        let mut high = actor_at(10.0, 0.0);
        high.location.z = 200.0;
        assert!(within_radius(&center, &high, 50.0));
    }
}
