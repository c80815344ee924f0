//! World module: owns the live actor snapshot, the entity layers and the
//! follow camera, and composites everything under the HUD.

use image::{Rgba, RgbaImage};
use rand::seq::IndexedRandom;
use tracing::{info, trace, warn};

use birdview_feed::{ActorState, Waypoint};

use crate::actor::{display_name, ClassifiedActors};
use crate::camera::{view_offset, within_radius, CameraMode};
use crate::drawing::{self, COLOR_BLUE, COLOR_MAGENTA, COLOR_WHITE};
use crate::glyphs::ShapeRenderer;
use crate::hud::{ActorLabel, PanelItem};
use crate::module::{Command, FrameContext, Module, MODULE_WORLD};
use crate::roads::RoadMap;
use crate::transform::{MapTransform, ScreenPoint, WorldBounds, WorldPoint};
use crate::{Error, FILTER_RADIUS};

const DISC_RADIUS: i32 = 3;
/// Labels sit this many meters above the vehicle.
const LABEL_LIFT: f64 = 4.0;
const HERO_RING_COLOR: Rgba<u8> = Rgba([255, 127, 0, 100]);

/// Source of live actor state. The binary wraps the TCP feed; tests
/// substitute scripted snapshots.
pub trait WorldFeed {
    /// Begin streaming ticks. Called once from module start.
    fn start(&mut self) -> Result<(), Error>;

    /// Latest actor snapshot.
    fn actors(&self) -> Vec<ActorState>;

    /// Tick rate reported by the feed.
    fn server_fps(&self) -> f64;
}

pub struct WorldModule {
    feed: Box<dyn WorldFeed>,
    transform: MapTransform,
    roads: RoadMap,
    shapes: ShapeRenderer,
    vehicles_layer: RgbaImage,
    traffic_lights_layer: RgbaImage,
    speed_limits_layer: RgbaImage,
    walkers_layer: RgbaImage,
    classified: ClassifiedActors,
    hero: Option<ActorState>,
    offset: (i32, i32),
}

impl WorldModule {
    pub fn new(
        display: (u32, u32),
        waypoints: &[Waypoint],
        spacing: f64,
        feed: Box<dyn WorldFeed>,
    ) -> Result<Self, Error> {
        let canvas = display.0.min(display.1);
        let bounds = WorldBounds::from_points(
            waypoints.iter().map(|wp| WorldPoint { x: wp.location.x, y: wp.location.y }),
        )?;
        let transform = MapTransform::new(bounds, canvas)?;
        let roads = RoadMap::build(waypoints, &transform, spacing);
        info!(
            waypoints = waypoints.len(),
            canvas, "map covers {:.0}x{:.0} m", bounds.width(), bounds.height()
        );

        Ok(WorldModule {
            feed,
            transform,
            roads,
            shapes: ShapeRenderer::new(),
            vehicles_layer: RgbaImage::new(canvas, canvas),
            traffic_lights_layer: RgbaImage::new(canvas, canvas),
            speed_limits_layer: RgbaImage::new(canvas, canvas),
            walkers_layer: RgbaImage::new(canvas, canvas),
            classified: ClassifiedActors::split(Vec::new()),
            hero: None,
            offset: (0, 0),
        })
    }

    fn toggle_hero(&self, ctx: &mut FrameContext, vehicles: &[ActorState]) {
        match ctx.camera.mode {
            CameraMode::Follow(_) => {
                info!("hero mode off");
                ctx.camera.mode = CameraMode::Free;
            }
            CameraMode::Free => match vehicles.choose(&mut rand::rng()) {
                Some(vehicle) => {
                    info!(id = %vehicle.id, "following {}", display_name(&vehicle.type_id));
                    ctx.camera.mode = CameraMode::Follow(vehicle.id);
                }
                None => warn!("no vehicles to follow"),
            },
        }
    }

    fn resolve_hero(&self, ctx: &mut FrameContext, vehicles: &[ActorState]) -> Option<ActorState> {
        match ctx.camera.mode {
            CameraMode::Follow(id) => match vehicles.iter().find(|vehicle| vehicle.id == id) {
                Some(vehicle) => Some(vehicle.clone()),
                None => {
                    warn!(%id, "hero vanished from the feed, back to free camera");
                    ctx.camera.mode = CameraMode::Free;
                    None
                }
            },
            CameraMode::Free => None,
        }
    }

    fn submit_info(&self, ctx: &mut FrameContext) {
        let mut items = vec![
            PanelItem::Text(format!("Server:  {:16} FPS", ctx.server_fps as i64)),
            PanelItem::Text(format!("Client:  {:16} FPS", ctx.client_fps as i64)),
        ];
        match &self.hero {
            Some(hero) => {
                let kmh = hero.velocity.speed() * 3.6;
                items.push(PanelItem::Text("Hero Mode:               ON".to_string()));
                items.push(PanelItem::Text(format!("Hero ID:               {:4}", hero.id.raw())));
                items.push(PanelItem::Text(format!(
                    "Hero Type ID:{:>12}",
                    display_name(&hero.type_id)
                )));
                items.push(PanelItem::Text(format!("Hero speed:          {:3} km/h", kmh as i64)));
            }
            None => items.push(PanelItem::Text("Hero Mode:               OFF".to_string())),
        }
        ctx.panel.submit(MODULE_WORLD, items);
    }

    fn publish_labels(&self, ctx: &mut FrameContext) {
        ctx.labels = self
            .classified
            .vehicles
            .iter()
            .map(|vehicle| {
                let point = self.transform.world_to_screen(WorldPoint {
                    x: vehicle.location.x,
                    y: vehicle.location.y - LABEL_LIFT,
                });
                ActorLabel {
                    id: vehicle.id,
                    position: ScreenPoint {
                        x: point.x + self.offset.0,
                        y: point.y + self.offset.1,
                    },
                }
            })
            .collect();
    }
}

impl Module for WorldModule {
    fn name(&self) -> &'static str {
        MODULE_WORLD
    }

    fn start(&mut self, _ctx: &mut FrameContext) -> Result<(), Error> {
        self.feed.start()
    }

    fn tick(&mut self, ctx: &mut FrameContext) {
        let mut classified = ClassifiedActors::split(self.feed.actors());
        if classified.skipped > 0 {
            trace!(count = classified.skipped, "unclassified actors skipped");
        }

        if ctx.consume(Command::ToggleHero) {
            self.toggle_hero(ctx, &classified.vehicles);
        }
        self.hero = self.resolve_hero(ctx, &classified.vehicles);

        if let Some(hero) = &self.hero {
            let center = hero.location;
            classified.vehicles.retain(|actor| within_radius(&center, actor, FILTER_RADIUS));
            classified
                .traffic_lights
                .retain(|actor| within_radius(&center, actor, FILTER_RADIUS));
            classified
                .speed_limits
                .retain(|actor| within_radius(&center, actor, FILTER_RADIUS));
            // Walkers stay visible at any distance.
        }
        self.classified = classified;

        let hero_screen = self.hero.as_ref().map(|hero| {
            self.transform
                .world_to_screen(WorldPoint { x: hero.location.x, y: hero.location.y })
        });
        self.offset =
            view_offset(&ctx.camera, ctx.display, self.transform.canvas_size(), hero_screen);

        ctx.server_fps = self.feed.server_fps();
        self.submit_info(ctx);
        self.publish_labels(ctx);
    }

    fn render(&mut self, ctx: &FrameContext, frame: &mut RgbaImage) {
        let offset = self.offset;
        drawing::blit(frame, self.roads.layer(ctx.antialiasing), offset.0, offset.1);

        drawing::clear(&mut self.vehicles_layer);
        drawing::clear(&mut self.traffic_lights_layer);
        drawing::clear(&mut self.speed_limits_layer);
        drawing::clear(&mut self.walkers_layer);

        self.shapes.draw_vehicles(
            &mut self.vehicles_layer,
            &self.classified.vehicles,
            COLOR_MAGENTA,
            &self.transform,
        );
        self.shapes.draw_traffic_lights(
            &mut self.traffic_lights_layer,
            &self.classified.traffic_lights,
            DISC_RADIUS,
            &self.transform,
        );
        self.shapes.draw_discs(
            &mut self.speed_limits_layer,
            &self.classified.speed_limits,
            COLOR_BLUE,
            DISC_RADIUS,
            &self.transform,
        );
        self.shapes.draw_discs(
            &mut self.walkers_layer,
            &self.classified.walkers,
            COLOR_WHITE,
            DISC_RADIUS,
            &self.transform,
        );

        drawing::blit(frame, &self.vehicles_layer, offset.0, offset.1);
        drawing::blit(frame, &self.traffic_lights_layer, offset.0, offset.1);
        drawing::blit(frame, &self.speed_limits_layer, offset.0, offset.1);
        drawing::blit(frame, &self.walkers_layer, offset.0, offset.1);

        if let Some(hero) = &self.hero {
            let bounds = self.transform.bounds();
            let radius =
                (FILTER_RADIUS / bounds.width() * self.transform.canvas_size() as f64) as i32;
            let center = self
                .transform
                .world_to_screen(WorldPoint { x: hero.location.x, y: hero.location.y });
            drawing::fill_circle_blend(
                frame,
                center.x + offset.0,
                center.y + offset.1,
                radius,
                HERO_RING_COLOR,
            );
        }
    }
}
