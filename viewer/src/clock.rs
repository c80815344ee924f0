//! Frame pacing and FPS estimation.

use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

/// Frames averaged for the FPS estimate.
const FPS_WINDOW: usize = 10;

/// Moving average over the last few inter-tick gaps.
#[derive(Debug, Default)]
struct ClockRing {
    gaps: VecDeque<f64>,
    last: Option<Instant>,
}

impl ClockRing {
    fn note(&mut self, now: Instant) {
        if let Some(last) = self.last {
            self.gaps.push_back(now.duration_since(last).as_secs_f64());
            if self.gaps.len() > FPS_WINDOW {
                self.gaps.pop_front();
            }
        }
        self.last = Some(now);
    }

    fn fps(&self) -> f64 {
        let total: f64 = self.gaps.iter().sum();
        if total <= 0.0 {
            return 0.0;
        }
        self.gaps.len() as f64 / total
    }
}

/// Paces the render loop at a fixed rate and reports the achieved FPS.
pub struct FrameClock {
    target: Duration,
    ring: ClockRing,
}

impl FrameClock {
    pub fn new(target_fps: u32) -> Self {
        FrameClock {
            target: Duration::from_secs(1) / target_fps.max(1),
            ring: ClockRing::default(),
        }
    }

    /// Wait out the rest of the current frame slot, then start the next
    /// one. Sleeps coarsely and spins for the last stretch to hold the
    /// target rate.
    pub fn tick(&mut self) {
        if let Some(last) = self.ring.last {
            let deadline = last + self.target;
            loop {
                let now = Instant::now();
                if now >= deadline {
                    break;
                }
                let remaining = deadline - now;
                if remaining > Duration::from_millis(2) {
                    std::thread::sleep(remaining - Duration::from_millis(1));
                } else {
                    std::hint::spin_loop();
                }
            }
        }
        self.ring.note(Instant::now());
    }

    /// Average frames per second over the recent window.
    pub fn fps(&self) -> f64 {
        self.ring.fps()
    }
}

/// FPS estimate over feed ticks. Shared with the stream callback, which
/// runs on the reader thread.
#[derive(Debug, Default)]
pub struct ServerClock {
    ring: Mutex<ClockRing>,
}

impl ServerClock {
    pub fn new() -> Self {
        ServerClock::default()
    }

    pub fn tick(&self) {
        self.ring
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .note(Instant::now());
    }

    pub fn fps(&self) -> f64 {
        self.ring.lock().unwrap_or_else(PoisonError::into_inner).fps()
    }
}
