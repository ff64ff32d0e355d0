//! Input arbitration
//!
//! Buttons are edge-detected against their previous sample; sensors are
//! evaluated only for the active target and guarded by a trigger lock so a
//! magnet held in place scores once. Debug characters from a serial console
//! enter through the same arbiter.

pub mod arbiter;
pub mod channel;
pub mod debug;

pub use arbiter::{InputArbiter, InputEvent, TriggerLock};
pub use channel::{ButtonChannel, Polarity};
pub use debug::DebugCommand;
