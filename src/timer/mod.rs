//! Cooperative deadline timers
//!
//! Poll-based countdowns used by the game engine, the display refresh and
//! the presentation animations. Nothing here spawns threads or sleeps: a
//! timer only fires when its owner calls [`DeadlineTimer::poll`].
//!
//! # Architecture
//!
//! - [`Clock`]: source of wrapping millisecond ticks (host or manual)
//! - [`DeadlineTimer`]: one-shot or repeating countdown with an expiry callback

pub mod clock;
pub mod deadline;

pub use clock::{Clock, ManualClock, MonotonicClock, SharedClock, Ticks, ticks_diff};
pub use deadline::{DeadlineTimer, MAX_DURATION_MS};
