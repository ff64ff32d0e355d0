//! Wire vocabulary.

use std::fmt;

use crate::engine::TargetId;
use crate::error::CommandError;

/// A command understood by the remote indicators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActuatorCommand {
    /// Every indicator off
    Off,
    /// Every indicator on
    All,
    /// Exactly this target's indicator on
    Target(TargetId),
}

impl ActuatorCommand {
    /// Encodes the command as its UTF-8 payload.
    #[must_use]
    pub fn to_payload(self) -> Vec<u8> {
        self.to_string().into_bytes()
    }

    /// Decodes a payload received for a set of `targets` indicators.
    ///
    /// Surrounding whitespace is ignored. Numbers must be written without
    /// sign or leading zeros.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError`] for non-UTF-8 payloads, unknown words and
    /// target numbers outside `1..=targets`.
    pub fn parse(payload: &[u8], targets: usize) -> Result<Self, CommandError> {
        let text = std::str::from_utf8(payload)
            .map_err(|_| CommandError::NotUtf8)?
            .trim();
        match text {
            "OFF" => Ok(Self::Off),
            "ALL" => Ok(Self::All),
            _ => {
                let number = text
                    .parse::<usize>()
                    .ok()
                    .filter(|n| n.to_string() == text)
                    .ok_or_else(|| CommandError::Unrecognized(text.to_string()))?;
                TargetId::from_number(number, targets)
                    .map(Self::Target)
                    .ok_or(CommandError::TargetOutOfRange { number, targets })
            }
        }
    }
}

impl fmt::Display for ActuatorCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Off => f.write_str("OFF"),
            Self::All => f.write_str("ALL"),
            Self::Target(id) => write!(f, "{}", id.number()),
        }
    }
}
