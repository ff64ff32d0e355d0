//! Engine state types.

use serde::Serialize;

/// Zero-based index of a target position.
///
/// Displayed (and sent over the air) one-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(into = "usize")]
pub struct TargetId(usize);

impl TargetId {
    /// Wraps a zero-based index.
    #[must_use]
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    /// Builds an id from a one-based number, if it is within `1..=targets`.
    #[must_use]
    pub const fn from_number(number: usize, targets: usize) -> Option<Self> {
        if number >= 1 && number <= targets {
            Some(Self(number - 1))
        } else {
            None
        }
    }

    /// Zero-based index.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }

    /// One-based number.
    #[must_use]
    pub const fn number(self) -> usize {
        self.0 + 1
    }
}

impl From<TargetId> for usize {
    fn from(id: TargetId) -> Self {
        id.number()
    }
}

impl std::fmt::Display for TargetId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.number())
    }
}

/// Top-level game state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GameState {
    /// Waiting for start
    #[default]
    Idle,
    /// A round is running
    Playing,
    /// Round finished; the final score stays up until start or reset
    GameOver,
}

impl std::fmt::Display for GameState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Idle => "idle",
            Self::Playing => "playing",
            Self::GameOver => "game_over",
        })
    }
}

/// Result of a catch attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatchOutcome {
    /// Right target; score incremented
    Caught,
    /// Wrong target while playing; recorded, nothing else changes
    Missed,
    /// Not playing
    Ignored,
}

/// Per-round counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RoundStats {
    /// Successful catches (equals the score)
    pub catches: u32,
    /// Catch attempts on the wrong target
    pub misses: u32,
    /// Targets that expired
    pub timeouts: u32,
}

/// Something that happened inside the engine.
///
/// Queued during `start`/`catch`/`reset`/`tick` and drained by the caller
/// for display, logging and metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineEvent {
    /// Round started
    Started,
    /// A new target became active
    TargetSpawned {
        /// New active target
        target: TargetId,
        /// Target it replaced, if any
        previous: Option<TargetId>,
    },
    /// Active target caught
    Caught {
        /// Target that was caught
        target: TargetId,
        /// Score after the catch
        score: u32,
    },
    /// Catch attempt on the wrong target
    Missed {
        /// Target that fired
        attempted: TargetId,
        /// Target that was active
        active: TargetId,
    },
    /// Per-target deadline passed
    TimedOut {
        /// Target that expired
        target: TargetId,
    },
    /// Session deadline passed
    GameOver {
        /// Final score
        score: u32,
        /// Round counters
        stats: RoundStats,
    },
    /// Engine returned to idle
    Reset,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_id_numbering() {
        let id = TargetId::new(2);
        assert_eq!(id.index(), 2);
        assert_eq!(id.number(), 3);
        assert_eq!(id.to_string(), "3");
    }

    #[test]
    fn test_from_number_bounds() {
        assert_eq!(TargetId::from_number(1, 5), Some(TargetId::new(0)));
        assert_eq!(TargetId::from_number(5, 5), Some(TargetId::new(4)));
        assert_eq!(TargetId::from_number(0, 5), None);
        assert_eq!(TargetId::from_number(6, 5), None);
    }

    #[test]
    fn test_target_id_serializes_one_based() {
        let json = serde_json::to_string(&TargetId::new(0)).unwrap();
        assert_eq!(json, "1");
    }

    #[test]
    fn test_state_display() {
        assert_eq!(GameState::GameOver.to_string(), "game_over");
        assert_eq!(GameState::default(), GameState::Idle);
    }
}
