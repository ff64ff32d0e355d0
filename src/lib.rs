//! `fishing-game` - timed target-acquisition game engine
//!
//! One target at a time is lit on a remote indicator set; the player brings
//! a magnet to the matching hall sensor before the target timer runs out.
//! Catches score, timeouts respawn, and the round ends when the game timer
//! expires.

pub mod actuator;
pub mod cli;
pub mod config;
pub mod display;
pub mod effects;
pub mod engine;
pub mod error;
pub mod input;
pub mod observability;
pub mod peripherals;
pub mod runtime;
pub mod timer;
pub mod transport;
