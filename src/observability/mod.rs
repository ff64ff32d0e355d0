//! Observability
//!
//! Logging, metrics and the structured game event stream. None of it can
//! stop the game loop: every sink swallows its own failures.

pub mod events;
pub mod logging;
pub mod metrics;
pub mod recorder;

pub use events::{EventEmitter, GameEvent};
pub use logging::{LogFormat, init_logging};
pub use metrics::init_metrics;
pub use recorder::GameRecorder;
