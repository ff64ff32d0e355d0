//! Actuator protocol
//!
//! Three words mirror the game onto a remote indicator set: `OFF`, `ALL` and
//! a one-based target number. The sender fires and forgets; the receiver
//! applies whatever arrives literally. Local state is always authoritative.

pub mod broadcaster;
pub mod command;
pub mod receiver;

pub use broadcaster::{ActuatorBroadcaster, BroadcastStats};
pub use command::ActuatorCommand;
pub use receiver::ActuatorReceiver;
