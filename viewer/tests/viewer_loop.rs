//! Drives the fully assembled viewer through the headless backend with a
//! scripted feed and checks what ends up on screen.

use std::sync::{Arc, Mutex};

use birdview::backend::{HeadlessBackend, InputEvent, Key, MouseButton, PointerState};
use birdview::camera::CameraMode;
use birdview::drawing::{COLOR_BLACK, COLOR_BLUE, COLOR_GREY, COLOR_MAGENTA};
use birdview::text::NullPainter;
use birdview::world::WorldFeed;
use birdview::{Error, Viewer, ViewerConfig};
use birdview_feed::{ActorId, ActorState, Extent, Location, Velocity, Waypoint};

#[derive(Clone, Default)]
struct ScriptedFeed {
    actors: Arc<Mutex<Vec<ActorState>>>,
}

impl ScriptedFeed {
    fn with(actors: Vec<ActorState>) -> Self {
        ScriptedFeed { actors: Arc::new(Mutex::new(actors)) }
    }

    fn replace(&self, actors: Vec<ActorState>) {
        *self.actors.lock().unwrap() = actors;
    }
}

impl WorldFeed for ScriptedFeed {
    fn start(&mut self) -> Result<(), Error> {
        Ok(())
    }

    fn actors(&self) -> Vec<ActorState> {
        self.actors.lock().unwrap().clone()
    }

    fn server_fps(&self) -> f64 {
        20.0
    }
}

fn vehicle(id: u32, x: f64, y: f64) -> ActorState {
    ActorState {
        id: ActorId(id),
        type_id: "vehicle.audi.tt".to_string(),
        location: Location { x, y, z: 0.0 },
        heading: 0.0,
        velocity: Velocity::default(),
        extent: Extent { x: 2.0, y: 1.0 },
        signal: None,
    }
}

fn waypoint(x: f64, y: f64) -> Waypoint {
    Waypoint {
        location: Location { x, y, z: 0.0 },
        heading: 0.0,
        lane_width: 4.0,
        is_intersection: false,
    }
}

// Corner waypoints pinning the world bounds to 0..100 on both axes. On a
// square 200 px display that projects 2 px per meter with no free-mode
// offset.
fn square_map() -> Vec<Waypoint> {
    vec![waypoint(0.0, 0.0), waypoint(100.0, 100.0)]
}

fn viewer_sized(feed: &ScriptedFeed, width: u32, height: u32) -> Viewer {
    let config = ViewerConfig { width, height, ..Default::default() };
    Viewer::new(&config, &square_map(), Box::new(feed.clone()), Box::new(NullPainter)).unwrap()
}

fn viewer_with(feed: &ScriptedFeed) -> Viewer {
    viewer_sized(feed, 200, 200)
}

fn key(ch: char) -> InputEvent {
    InputEvent::KeyUp(Key::Char(ch))
}

#[test]
fn the_composited_frame_shows_the_map_and_the_vehicles() {
    let feed = ScriptedFeed::with(vec![vehicle(7, 50.0, 50.0)]);
    let mut viewer = viewer_with(&feed);
    let mut backend = HeadlessBackend::new(200, 200);

    // Hide the panel strip so the probes below see unblended colors.
    backend.push_events(vec![key('i')]);
    viewer.run_frames(&mut backend, 1);
    let frame = backend.last_frame().unwrap();

    // Map background away from any lane
    assert_eq!(*frame.get_pixel(10, 10), COLOR_GREY);
    // Vehicle body, with the heading arrow owning the center pixel
    assert_eq!(*frame.get_pixel(98, 99), COLOR_MAGENTA);
    assert_eq!(*frame.get_pixel(100, 100), COLOR_BLUE);
}

#[test]
fn pressing_h_follows_the_vehicle_and_centers_it() {
    let feed = ScriptedFeed::with(vec![vehicle(7, 25.0, 25.0)]);
    let mut viewer = viewer_with(&feed);
    let mut backend = HeadlessBackend::new(200, 200);

    backend.push_events(vec![key('h'), key('i')]);
    viewer.run_frames(&mut backend, 1);
    assert_eq!(viewer.camera().mode, CameraMode::Follow(ActorId(7)));

    let frame = backend.last_frame().unwrap();
    // The hero was at screen (50, 50); following must shift it to the
    // display center, under the orange ring tint.
    let body = frame.get_pixel(98, 99);
    assert!(body[0] >= 250, "expected a ring-tinted hero body, got {body:?}");
    assert!(body[2] < 200, "expected a ring-tinted hero body, got {body:?}");
    // The shifted canvas no longer covers the far corner
    assert_eq!(*frame.get_pixel(190, 10), COLOR_BLACK);

    backend.push_events(vec![key('h')]);
    viewer.run_frames(&mut backend, 1);
    assert_eq!(viewer.camera().mode, CameraMode::Free);
}

#[test]
fn a_vanished_hero_falls_back_to_the_free_camera() {
    let feed = ScriptedFeed::with(vec![vehicle(7, 25.0, 25.0)]);
    let mut viewer = viewer_with(&feed);
    let mut backend = HeadlessBackend::new(200, 200);

    backend.push_events(vec![key('h')]);
    viewer.run_frames(&mut backend, 1);
    assert_eq!(viewer.camera().mode, CameraMode::Follow(ActorId(7)));

    feed.replace(Vec::new());
    viewer.run_frames(&mut backend, 1);
    assert_eq!(viewer.camera().mode, CameraMode::Free);
    assert_eq!(backend.frames_presented(), 2);
}

#[test]
fn escape_stops_the_loop_after_one_frame() {
    let feed = ScriptedFeed::with(Vec::new());
    let mut viewer = viewer_with(&feed);
    let mut backend = HeadlessBackend::new(200, 200);

    backend.push_events(vec![InputEvent::KeyUp(Key::Escape)]);
    viewer.run(&mut backend);

    assert!(viewer.should_quit());
    assert_eq!(backend.frames_presented(), 1);
}

#[test]
fn dragging_pans_the_map() {
    let feed = ScriptedFeed::with(Vec::new());
    let mut viewer = viewer_with(&feed);
    let mut backend = HeadlessBackend::new(200, 200);

    // Press at (100, 100), then drag to (120, 90). The panel is hidden so
    // the probes below see unblended colors.
    backend.push_events(vec![
        InputEvent::MouseButtonDown { button: MouseButton::Left, position: (100, 100) },
        key('i'),
    ]);
    backend.set_pointer(PointerState { position: (100, 100), left_down: true });
    viewer.run_frames(&mut backend, 1);

    backend.set_pointer(PointerState { position: (120, 90), left_down: true });
    viewer.run_frames(&mut backend, 1);

    assert_eq!(viewer.camera().pan, (20.0, -10.0));
    let frame = backend.last_frame().unwrap();
    // The canvas moved right and up, exposing black on the left edge
    assert_eq!(*frame.get_pixel(10, 5), COLOR_BLACK);
    assert_eq!(*frame.get_pixel(30, 25), COLOR_GREY);
}

#[test]
fn wheel_zoom_accumulates_and_respects_the_floor() {
    let feed = ScriptedFeed::with(Vec::new());
    let mut viewer = viewer_with(&feed);
    let mut backend = HeadlessBackend::new(200, 200);

    backend.push_events(vec![InputEvent::MouseButtonDown {
        button: MouseButton::WheelUp,
        position: (0, 0),
    }]);
    viewer.run_frames(&mut backend, 1);
    assert!((viewer.camera().zoom.0 - 1.1).abs() < 1e-9);

    for _ in 0..15 {
        backend.push_events(vec![InputEvent::MouseButtonDown {
            button: MouseButton::WheelDown,
            position: (0, 0),
        }]);
    }
    viewer.run_frames(&mut backend, 15);
    assert_eq!(viewer.camera().zoom, (0.1, 0.1));
}

#[test]
fn the_info_panel_toggles_with_i() {
    let feed = ScriptedFeed::with(Vec::new());
    let mut viewer = viewer_sized(&feed, 300, 200);
    let mut backend = HeadlessBackend::new(300, 200);

    viewer.run_frames(&mut backend, 1);
    let frame = backend.last_frame().unwrap();
    // The canvas sits at x offset 50; the strip darkens everything left
    // of x = 240 while the sliver of map beyond it keeps its color.
    assert!(frame.get_pixel(150, 100)[0] < 100);
    assert_eq!(*frame.get_pixel(245, 100), COLOR_GREY);

    backend.push_events(vec![key('i')]);
    viewer.run_frames(&mut backend, 1);
    let frame = backend.last_frame().unwrap();
    assert_eq!(*frame.get_pixel(150, 100), COLOR_GREY);
}
