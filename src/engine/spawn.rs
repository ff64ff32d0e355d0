//! Target selection.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::ConfigError;

use super::state::TargetId;

/// Uniform target picker that never repeats the previous target.
#[derive(Debug)]
pub struct TargetPicker {
    rng: StdRng,
    targets: usize,
}

impl TargetPicker {
    /// Creates a picker over `targets` positions.
    ///
    /// A fixed `seed` makes the sequence reproducible.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] if `targets < 2`: with a single
    /// position there is no target to move to.
    pub fn new(targets: usize, seed: Option<u64>) -> Result<Self, ConfigError> {
        if targets < 2 {
            return Err(ConfigError::InvalidValue {
                field: "game.targets".to_string(),
                value: targets.to_string(),
                expected: "at least 2".to_string(),
            });
        }
        let rng = seed.map_or_else(StdRng::from_os_rng, StdRng::seed_from_u64);
        Ok(Self { rng, targets })
    }

    /// Draws a target uniformly from `0..targets`, resampling while it
    /// equals `previous`.
    pub fn pick(&mut self, previous: Option<TargetId>) -> TargetId {
        loop {
            let candidate = TargetId::new(self.rng.random_range(0..self.targets));
            if Some(candidate) != previous {
                return candidate;
            }
        }
    }

    /// Number of positions.
    #[must_use]
    pub const fn targets(&self) -> usize {
        self.targets
    }
}
