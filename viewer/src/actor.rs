//! Actor classification at snapshot ingest.

use birdview_feed::ActorState;

/// Rendering category an actor falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActorClass {
    Vehicle,
    TrafficLight,
    SpeedLimit,
    Walker,
}

impl ActorClass {
    /// Classify a blueprint identifier by substring. First match wins, in
    /// this order: vehicle, traffic_light, speed_limit, walker. Anything
    /// else is not drawn.
    pub fn from_type_id(type_id: &str) -> Option<ActorClass> {
        if type_id.contains("vehicle") {
            Some(ActorClass::Vehicle)
        } else if type_id.contains("traffic_light") {
            Some(ActorClass::TrafficLight)
        } else if type_id.contains("speed_limit") {
            Some(ActorClass::SpeedLimit)
        } else if type_id.contains("walker") {
            Some(ActorClass::Walker)
        } else {
            None
        }
    }
}

/// A snapshot split into its render groups.
#[derive(Debug, Default, Clone)]
pub struct ClassifiedActors {
    pub vehicles: Vec<ActorState>,
    pub traffic_lights: Vec<ActorState>,
    pub speed_limits: Vec<ActorState>,
    pub walkers: Vec<ActorState>,
    /// Actors whose type id matched no category. Never drawn.
    pub skipped: usize,
}

impl ClassifiedActors {
    pub fn split(actors: Vec<ActorState>) -> Self {
        let mut out = ClassifiedActors::default();
        for actor in actors {
            match ActorClass::from_type_id(&actor.type_id) {
                Some(ActorClass::Vehicle) => out.vehicles.push(actor),
                Some(ActorClass::TrafficLight) => out.traffic_lights.push(actor),
                Some(ActorClass::SpeedLimit) => out.speed_limits.push(actor),
                Some(ActorClass::Walker) => out.walkers.push(actor),
                None => out.skipped += 1,
            }
        }
        out
    }
}

/// Human-readable tail of a blueprint id: `vehicle.audi.tt` becomes
/// `audi tt`. Ids without a dot pass through unchanged.
pub fn display_name(type_id: &str) -> String {
    match type_id.split_once('.') {
        Some((_, rest)) => rest.replace('.', " "),
        None => type_id.to_string(),
    }
}
