//! Adapter between the TCP feed and the world module.

use std::sync::{Arc, Weak};

use tracing::trace;

use birdview_feed::{ActorState, WorldHandle};

use crate::clock::ServerClock;
use crate::world::WorldFeed;
use crate::Error;

pub struct LiveWorld {
    world: WorldHandle,
    clock: Arc<ServerClock>,
}

impl LiveWorld {
    pub fn new(world: WorldHandle) -> Self {
        LiveWorld { world, clock: Arc::new(ServerClock::new()) }
    }
}

impl WorldFeed for LiveWorld {
    fn start(&mut self) -> Result<(), Error> {
        // The callback holds only a weak clock reference, so a tick that
        // lands after the viewer tears down is a no-op.
        let clock: Weak<ServerClock> = Arc::downgrade(&self.clock);
        self.world.on_tick(move |tick| {
            let Some(clock) = clock.upgrade() else {
                return;
            };
            clock.tick();
            trace!(frame = tick.frame, "server tick");
        })?;
        Ok(())
    }

    fn actors(&self) -> Vec<ActorState> {
        self.world.actors()
    }

    fn server_fps(&self) -> f64 {
        self.clock.fps()
    }
}
