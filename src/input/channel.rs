//! Polarity-aware button channels.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::peripherals::DigitalInput;

/// Which logical level means "asserted".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Polarity {
    /// Asserted when the pin reads low (pull-up wiring).
    #[default]
    ActiveLow,
    /// Asserted when the pin reads high.
    ActiveHigh,
}

impl Polarity {
    /// Maps a raw level to asserted / not asserted.
    #[must_use]
    pub const fn is_asserted(self, level: bool) -> bool {
        match self {
            Self::ActiveLow => !level,
            Self::ActiveHigh => level,
        }
    }

    /// The raw level of an idle (released) input.
    #[must_use]
    pub const fn released_level(self) -> bool {
        matches!(self, Self::ActiveLow)
    }
}

/// A push button with edge detection.
///
/// Fires once per press: the channel must observe the released level
/// before another press is reported. There is no time-based debounce.
pub struct ButtonChannel {
    name: &'static str,
    pin: Box<dyn DigitalInput>,
    polarity: Polarity,
    last_level: bool,
    faulted: bool,
}

impl ButtonChannel {
    /// Wraps a pin, assuming it starts released.
    #[must_use]
    pub fn new(name: &'static str, pin: Box<dyn DigitalInput>, polarity: Polarity) -> Self {
        Self {
            name,
            pin,
            polarity,
            last_level: polarity.released_level(),
            faulted: false,
        }
    }

    /// Samples the pin; `true` on a released-to-asserted transition.
    ///
    /// A read failure counts as "no press" and is logged on the first
    /// occurrence only.
    pub fn pressed(&mut self) -> bool {
        let level = match self.pin.read_level() {
            Ok(level) => {
                self.faulted = false;
                level
            }
            Err(error) => {
                if !self.faulted {
                    warn!(button = self.name, %error, "button read failed");
                    self.faulted = true;
                }
                return false;
            }
        };
        let edge = self.polarity.is_asserted(level) && !self.polarity.is_asserted(self.last_level);
        self.last_level = level;
        edge
    }

    /// Channel name, for logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }
}

impl std::fmt::Debug for ButtonChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ButtonChannel")
            .field("name", &self.name)
            .field("polarity", &self.polarity)
            .field("last_level", &self.last_level)
            .finish_non_exhaustive()
    }
}
