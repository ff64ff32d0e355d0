//! Millisecond tick sources
//!
//! Boards expose a free-running millisecond counter that wraps around; the
//! timers only ever look at the wrapping difference between two readings, so
//! the host clock deliberately truncates to the same width.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Instant;

/// Raw millisecond tick reading. Wraps every ~49.7 days.
pub type Ticks = u32;

/// Clock shared between the engine, its timers and the game loop.
pub type SharedClock = Arc<dyn Clock>;

/// A monotonic millisecond tick source.
pub trait Clock: Send + Sync {
    /// Returns the current tick count.
    fn now_ms(&self) -> Ticks;
}

/// Wraparound-safe difference `now - earlier` in milliseconds.
///
/// Correct as long as the real interval is shorter than half the tick range.
#[must_use]
pub const fn ticks_diff(now: Ticks, earlier: Ticks) -> u32 {
    now.wrapping_sub(earlier)
}

/// Host clock backed by [`Instant`].
#[derive(Debug, Clone)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    /// Creates a clock whose tick zero is "now".
    #[must_use]
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }

    /// Creates a shared handle to a new host clock.
    #[must_use]
    pub fn shared() -> SharedClock {
        Arc::new(Self::new())
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    #[allow(clippy::cast_possible_truncation)]
    fn now_ms(&self) -> Ticks {
        // Truncation is the wrap.
        self.origin.elapsed().as_millis() as Ticks
    }
}

/// Manually advanced clock for tests and scripted simulations.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicU32,
}

impl ManualClock {
    /// Creates a clock reading `start`.
    #[must_use]
    pub const fn new(start: Ticks) -> Self {
        Self {
            now: AtomicU32::new(start),
        }
    }

    /// Creates a shared clock reading `start`.
    ///
    /// Keep the returned `Arc<ManualClock>` to drive time and hand out
    /// clones of it as [`SharedClock`].
    #[must_use]
    pub fn shared(start: Ticks) -> Arc<Self> {
        Arc::new(Self::new(start))
    }

    /// Moves the clock forward by `millis`, wrapping like board ticks do.
    pub fn advance(&self, millis: u32) {
        let _ = self
            .now
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |t| {
                Some(t.wrapping_add(millis))
            });
    }

    /// Sets the absolute tick reading.
    pub fn set(&self, ticks: Ticks) {
        self.now.store(ticks, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> Ticks {
        self.now.load(Ordering::SeqCst)
    }
}
