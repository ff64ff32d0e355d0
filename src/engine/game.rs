//! Game state machine.

use std::sync::mpsc::{self, Receiver};
use std::time::Duration;

use tracing::{debug, info};

use crate::actuator::{ActuatorBroadcaster, ActuatorCommand};
use crate::config::GameConfig;
use crate::error::GameError;
use crate::timer::{DeadlineTimer, SharedClock};

use super::spawn::TargetPicker;
use super::state::{CatchOutcome, EngineEvent, GameState, RoundStats, TargetId};

/// Session parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineSettings {
    /// Length of a round
    pub game_duration: Duration,
    /// Time allowed per target
    pub target_duration: Duration,
    /// Number of target positions
    pub targets: usize,
    /// Fixed RNG seed for reproducible target sequences
    pub seed: Option<u64>,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            game_duration: Duration::from_secs(30),
            target_duration: Duration::from_secs(5),
            targets: 5,
            seed: None,
        }
    }
}

impl EngineSettings {
    /// Settings from the `game` section of a loaded configuration.
    #[must_use]
    pub fn from_config(config: &GameConfig, seed: Option<u64>) -> Self {
        Self {
            game_duration: config.game.duration,
            target_duration: config.game.target_duration,
            targets: usize::from(config.game.targets),
            seed,
        }
    }
}

/// Which deadline fired; sent from the timer callbacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Expiry {
    Game,
    Target,
}

/// The Idle / Playing / GameOver machine.
///
/// Constructed once per process. Timers are created here and only ever
/// started and stopped afterwards; reset clears state without rebuilding
/// anything.
pub struct GameEngine {
    state: GameState,
    score: u32,
    active: Option<TargetId>,
    stats: RoundStats,
    game_timer: DeadlineTimer,
    target_timer: DeadlineTimer,
    expiries: Receiver<Expiry>,
    picker: TargetPicker,
    broadcaster: ActuatorBroadcaster,
    events: Vec<EngineEvent>,
}

impl GameEngine {
    /// Builds the engine and arms (but does not start) both timers.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if either duration is zero or out of
    /// range, or if fewer than two targets are configured.
    pub fn new(
        settings: &EngineSettings,
        clock: SharedClock,
        broadcaster: ActuatorBroadcaster,
    ) -> Result<Self, GameError> {
        let picker = TargetPicker::new(settings.targets, settings.seed)?;
        let (tx, expiries) = mpsc::channel();

        let mut game_timer =
            DeadlineTimer::with_duration("game", clock.clone(), settings.game_duration, true)?;
        let game_tx = tx.clone();
        game_timer.set_callback(move |_| {
            // The receiver lives as long as the engine that owns this timer.
            let _ = game_tx.send(Expiry::Game);
        });
        game_timer.ensure_armable()?;

        let mut target_timer =
            DeadlineTimer::with_duration("target", clock, settings.target_duration, true)?;
        target_timer.set_callback(move |_| {
            let _ = tx.send(Expiry::Target);
        });
        target_timer.ensure_armable()?;

        debug!(
            game_ms = settings.game_duration.as_millis(),
            target_ms = settings.target_duration.as_millis(),
            targets = settings.targets,
            "engine ready"
        );

        Ok(Self {
            state: GameState::Idle,
            score: 0,
            active: None,
            stats: RoundStats::default(),
            game_timer,
            target_timer,
            expiries,
            picker,
            broadcaster,
            events: Vec::new(),
        })
    }

    // ========================================================================
    // Transitions
    // ========================================================================

    /// Starts a round from Idle or GameOver. Ignored while playing.
    ///
    /// Returns whether a round was started.
    pub fn start(&mut self) -> bool {
        if self.state == GameState::Playing {
            debug!("start ignored: already playing");
            return false;
        }
        self.state = GameState::Playing;
        self.score = 0;
        self.stats = RoundStats::default();
        self.active = None;
        self.game_timer.start();
        self.events.push(EngineEvent::Started);
        info!(targets = self.picker.targets(), "round started");
        self.spawn();
        true
    }

    /// Reports a trigger on `target`.
    pub fn catch(&mut self, target: TargetId) -> CatchOutcome {
        let Some(active) = self.active.filter(|_| self.state == GameState::Playing) else {
            debug!(%target, state = %self.state, "catch ignored: not playing");
            return CatchOutcome::Ignored;
        };
        if target != active {
            self.stats.misses += 1;
            debug!(%target, %active, "catch on wrong target");
            self.events.push(EngineEvent::Missed {
                attempted: target,
                active,
            });
            return CatchOutcome::Missed;
        }

        self.score += 1;
        self.stats.catches += 1;
        self.target_timer.stop();
        info!(%target, score = self.score, "target caught");
        self.events.push(EngineEvent::Caught {
            target,
            score: self.score,
        });
        self.broadcaster.send(ActuatorCommand::Off);
        self.spawn();
        CatchOutcome::Caught
    }

    /// Returns to Idle from any state.
    pub fn reset(&mut self) {
        self.game_timer.stop();
        self.target_timer.stop();
        self.discard_expiries();
        self.state = GameState::Idle;
        self.score = 0;
        self.stats = RoundStats::default();
        self.active = None;
        self.broadcaster.send(ActuatorCommand::Off);
        self.events.push(EngineEvent::Reset);
        info!("reset to idle");
    }

    /// Polls both deadlines and applies whatever expired.
    ///
    /// The session deadline is handled first, so a target deadline that is
    /// due in the same iteration is never acted on after game over.
    pub fn tick(&mut self) {
        if self.game_timer.poll() {
            self.apply_expiries();
        }
        if self.target_timer.poll() {
            self.apply_expiries();
        }
    }

    fn apply_expiries(&mut self) {
        while let Ok(expiry) = self.expiries.try_recv() {
            match expiry {
                Expiry::Game => self.finish(),
                Expiry::Target => self.target_expired(),
            }
        }
    }

    fn discard_expiries(&self) {
        while self.expiries.try_recv().is_ok() {}
    }

    fn target_expired(&mut self) {
        let Some(target) = self.active.filter(|_| self.state == GameState::Playing) else {
            return;
        };
        self.stats.timeouts += 1;
        info!(%target, "target timed out");
        self.events.push(EngineEvent::TimedOut { target });
        self.broadcaster.send(ActuatorCommand::Off);
        self.spawn();
    }

    fn finish(&mut self) {
        if self.state != GameState::Playing {
            return;
        }
        self.target_timer.stop();
        self.game_timer.stop();
        self.state = GameState::GameOver;
        self.active = None;
        self.broadcaster.send(ActuatorCommand::Off);
        info!(score = self.score, misses = self.stats.misses, timeouts = self.stats.timeouts, "game over");
        self.events.push(EngineEvent::GameOver {
            score: self.score,
            stats: self.stats,
        });
    }

    fn spawn(&mut self) {
        let previous = self.active;
        let target = self.picker.pick(previous);
        self.active = Some(target);
        self.target_timer.start();
        self.broadcaster.send(ActuatorCommand::Target(target));
        debug!(%target, "target spawned");
        self.events.push(EngineEvent::TargetSpawned { target, previous });
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Takes the events queued since the last call.
    pub fn drain_events(&mut self) -> Vec<EngineEvent> {
        std::mem::take(&mut self.events)
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> GameState {
        self.state
    }

    /// Current score.
    #[must_use]
    pub const fn score(&self) -> u32 {
        self.score
    }

    /// Active target; `Some` only while playing.
    #[must_use]
    pub const fn active_target(&self) -> Option<TargetId> {
        self.active
    }

    /// Counters for the current (or last finished) round.
    #[must_use]
    pub const fn stats(&self) -> RoundStats {
        self.stats
    }

    /// Number of target positions.
    #[must_use]
    pub const fn targets(&self) -> usize {
        self.picker.targets()
    }

    /// Time left in the round; `None` unless playing.
    #[must_use]
    pub fn game_remaining(&self) -> Option<Duration> {
        self.game_timer.remaining()
    }

    /// Time left for the active target; `None` unless playing.
    #[must_use]
    pub fn target_remaining(&self) -> Option<Duration> {
        self.target_timer.remaining()
    }

    /// Whether the per-target deadline is armed.
    #[must_use]
    pub const fn target_timer_running(&self) -> bool {
        self.target_timer.is_running()
    }

    /// Whether the session deadline is armed.
    #[must_use]
    pub const fn game_timer_running(&self) -> bool {
        self.game_timer.is_running()
    }

    /// The actuator sender, for presentation effects.
    pub const fn broadcaster_mut(&mut self) -> &mut ActuatorBroadcaster {
        &mut self.broadcaster
    }

    /// The actuator sender.
    #[must_use]
    pub const fn broadcaster(&self) -> &ActuatorBroadcaster {
        &self.broadcaster
    }
}

impl std::fmt::Debug for GameEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameEngine")
            .field("state", &self.state)
            .field("score", &self.score)
            .field("active", &self.active)
            .field("stats", &self.stats)
            .field("game_timer", &self.game_timer)
            .field("target_timer", &self.target_timer)
            .finish_non_exhaustive()
    }
}
