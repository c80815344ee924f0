use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier the simulator assigns to every spawned actor.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActorId(pub u32);

impl ActorId {
    pub fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for ActorId {
    fn from(id: u32) -> Self {
        ActorId(id)
    }
}

/// World-space position in meters. The vertical axis is `z`; the map view
/// only uses `x` and `y`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub z: f64,
}

/// Velocity vector in meters per second.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Velocity {
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub z: f64,
}

impl Velocity {
    /// Magnitude in meters per second.
    pub fn speed(&self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }
}

/// Bounding-box half extents in meters, measured from the actor center.
/// `x` runs along the actor's forward axis.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Extent {
    pub x: f64,
    pub y: f64,
}

/// Phase of a traffic light as reported by the simulator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SignalState {
    Green,
    Yellow,
    Red,
    Off,
    Unknown,
}

/// One actor's state as carried in a feed snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActorState {
    pub id: ActorId,
    /// Dotted blueprint identifier, e.g. `vehicle.audi.tt`.
    pub type_id: String,
    pub location: Location,
    /// Heading in degrees. Zero points along +X and positive angles turn
    /// +X toward +Y.
    #[serde(default)]
    pub heading: f64,
    #[serde(default)]
    pub velocity: Velocity,
    /// Zero for point-sized actors such as signs.
    #[serde(default)]
    pub extent: Extent,
    /// Present for traffic lights only.
    #[serde(default)]
    pub signal: Option<SignalState>,
}

/// A sampled point of the road network.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    pub location: Location,
    /// Road direction at this point, same convention as actor headings.
    pub heading: f64,
    /// Lane width in meters.
    pub lane_width: f64,
    /// True when the waypoint lies inside a junction.
    #[serde(default)]
    pub is_intersection: bool,
}

/// One streamed world tick, handed to the `on_tick` callback after the
/// actor snapshot has been replaced.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickEvent {
    pub frame: u64,
    /// Simulation seconds since the server started.
    pub elapsed_seconds: f64,
    /// Seconds since the previous tick, zero on the first one.
    pub delta_seconds: f64,
}
