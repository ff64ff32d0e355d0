//! Game engine
//!
//! The Idle / Playing / GameOver state machine. The engine owns two one-shot
//! deadline timers (session and per-target) and the actuator broadcaster;
//! the caller feeds it input events and calls [`GameEngine::tick`] once per
//! loop iteration.

pub mod game;
pub mod spawn;
pub mod state;

pub use game::{EngineSettings, GameEngine};
pub use spawn::TargetPicker;
pub use state::{CatchOutcome, EngineEvent, GameState, RoundStats, TargetId};
