pub mod client;
pub mod error;
pub mod protocol;
pub mod types;

pub use client::{MapHandle, WorldHandle, connect};
pub use error::FeedError;
pub use types::{ActorId, ActorState, Extent, Location, SignalState, TickEvent, Velocity, Waypoint};
