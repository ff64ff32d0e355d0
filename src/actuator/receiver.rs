//! Remote indicator side.

use tracing::{debug, info};

use crate::engine::TargetId;
use crate::error::CommandError;
use crate::peripherals::DigitalOutput;

use super::command::ActuatorCommand;

/// Drives N indicator outputs from received payloads.
pub struct ActuatorReceiver {
    outputs: Vec<Box<dyn DigitalOutput>>,
    lit: Vec<bool>,
}

impl ActuatorReceiver {
    /// Takes ownership of the outputs and switches them all off.
    #[must_use]
    pub fn new(outputs: Vec<Box<dyn DigitalOutput>>) -> Self {
        let lit = vec![false; outputs.len()];
        let mut receiver = Self { outputs, lit };
        receiver.apply(ActuatorCommand::Off);
        receiver
    }

    /// Decodes and applies one payload.
    ///
    /// # Errors
    ///
    /// Returns the decode error for anything outside the vocabulary; the
    /// outputs are left untouched.
    pub fn handle(&mut self, payload: &[u8]) -> Result<ActuatorCommand, CommandError> {
        match ActuatorCommand::parse(payload, self.outputs.len()) {
            Ok(command) => {
                self.apply(command);
                info!(%command, pattern = %self.pattern(), "indicators updated");
                Ok(command)
            }
            Err(error) => {
                debug!(%error, "payload ignored");
                Err(error)
            }
        }
    }

    /// Applies a decoded command.
    pub fn apply(&mut self, command: ActuatorCommand) {
        match command {
            ActuatorCommand::Off => self.set_all(false),
            ActuatorCommand::All => self.set_all(true),
            ActuatorCommand::Target(target) => self.set_only(target),
        }
    }

    fn set_all(&mut self, on: bool) {
        for (output, lit) in self.outputs.iter_mut().zip(self.lit.iter_mut()) {
            output.set_level(on);
            *lit = on;
        }
    }

    fn set_only(&mut self, target: TargetId) {
        self.set_all(false);
        if let Some(output) = self.outputs.get_mut(target.index()) {
            output.set_level(true);
            self.lit[target.index()] = true;
        }
    }

    /// Current output levels.
    #[must_use]
    pub fn lit(&self) -> &[bool] {
        &self.lit
    }

    /// Output levels as a compact string, e.g. `..#..`.
    #[must_use]
    pub fn pattern(&self) -> String {
        self.lit.iter().map(|&on| if on { '#' } else { '.' }).collect()
    }
}

impl std::fmt::Debug for ActuatorReceiver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActuatorReceiver")
            .field("lit", &self.pattern())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::peripherals::VirtualBoard;

    fn receiver() -> (ActuatorReceiver, Vec<crate::peripherals::VirtualLevel>) {
        let pins = ["D2", "D3", "D4", "D5", "D6"];
        let mut board = VirtualBoard::new(pins);
        let levels: Vec<_> = pins.iter().map(|p| board.level(p).unwrap()).collect();
        let outputs = levels
            .iter()
            .map(|l| Box::new(l.clone()) as Box<dyn DigitalOutput>)
            .collect();
        (ActuatorReceiver::new(outputs), levels)
    }

    #[test]
    fn test_starts_dark() {
        let (receiver, levels) = receiver();
        assert_eq!(receiver.pattern(), ".....");
        assert!(levels.iter().all(|l| !l.get()));
    }

    #[test]
    fn test_digit_lights_exactly_one() {
        let (mut receiver, levels) = receiver();
        receiver.handle(b"ALL").unwrap();
        receiver.handle(b"3").unwrap();
        assert_eq!(receiver.pattern(), "..#..");
        assert!(levels[2].get());
        assert!(!levels[0].get());
    }

    #[test]
    fn test_all_and_off() {
        let (mut receiver, _) = receiver();
        receiver.handle(b"ALL").unwrap();
        assert_eq!(receiver.lit(), &[true; 5]);
        receiver.handle(b"OFF").unwrap();
        assert_eq!(receiver.lit(), &[false; 5]);
    }

    #[test]
    fn test_garbage_leaves_outputs_untouched() {
        let (mut receiver, _) = receiver();
        receiver.handle(b"2").unwrap();
        assert!(receiver.handle(b"BLINK").is_err());
        assert!(receiver.handle(b"9").is_err());
        assert!(receiver.handle(&[0xc3]).is_err());
        assert_eq!(receiver.pattern(), ".#...");
    }
}
