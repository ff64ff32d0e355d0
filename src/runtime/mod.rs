//! Host runtime
//!
//! [`GameLoop`] is the cooperative control loop: sample inputs, poll every
//! timer, render, sleep. `step()` runs one iteration without sleeping so
//! tests can drive it with a manual clock; `run()` paces it with a tokio
//! interval until cancelled.

pub mod console;

pub use console::spawn_stdin_reader;

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::actuator::ActuatorCommand;
use crate::config::GameConfig;
use crate::display::{Panel, Scoreboard};
use crate::effects::{Animation, AnimationKind, AnimationPlayer};
use crate::engine::{EngineEvent, GameEngine, GameState};
use crate::error::GameError;
use crate::input::{DebugCommand, InputArbiter, InputEvent};
use crate::observability::GameRecorder;
use crate::timer::{DeadlineTimer, SharedClock};

/// Loop pacing and presentation switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopSettings {
    /// Sleep between iterations
    pub poll_interval: Duration,
    /// Scoreboard refresh period
    pub display_refresh: Duration,
    /// Play the countdown before a round
    pub countdown: bool,
}

impl Default for LoopSettings {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(10),
            display_refresh: Duration::from_millis(100),
            countdown: true,
        }
    }
}

impl LoopSettings {
    /// Settings from a loaded configuration.
    #[must_use]
    pub const fn from_config(config: &GameConfig) -> Self {
        Self {
            poll_interval: config.game_loop.poll_interval,
            display_refresh: config.game.display_refresh,
            countdown: config.game.countdown,
        }
    }
}

/// Why `run()` returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    /// Iterations executed
    pub iterations: u64,
    /// State at shutdown
    pub final_state: GameState,
    /// Score at shutdown
    pub final_score: u32,
}

/// Owns the engine and everything around it.
pub struct GameLoop {
    engine: GameEngine,
    arbiter: InputArbiter,
    scoreboard: Scoreboard,
    animations: AnimationPlayer,
    refresh: DeadlineTimer,
    recorder: GameRecorder,
    settings: LoopSettings,
    iterations: u64,
}

impl GameLoop {
    /// Wires the loop together and puts the game in its idle state:
    /// indicators off, `00:00` and `Strt` on the displays.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the refresh period is invalid.
    pub fn new(
        mut engine: GameEngine,
        arbiter: InputArbiter,
        scoreboard: Scoreboard,
        recorder: GameRecorder,
        clock: SharedClock,
        settings: LoopSettings,
    ) -> Result<Self, GameError> {
        let mut refresh =
            DeadlineTimer::with_duration("display", clock.clone(), settings.display_refresh, false)?;
        // Rendering happens on `poll`'s return value.
        refresh.set_callback(|_| {});
        refresh.ensure_armable()?;
        refresh.start();

        engine.reset();
        let mut game_loop = Self {
            engine,
            arbiter,
            scoreboard,
            animations: AnimationPlayer::new(clock),
            refresh,
            recorder,
            settings,
            iterations: 0,
        };
        game_loop.drain_engine_events();
        game_loop.render();
        Ok(game_loop)
    }

    /// Queues a character typed on the debug console.
    pub fn push_debug(&mut self, ch: char) {
        match DebugCommand::parse(ch, self.engine.targets()) {
            Ok(command) => self.arbiter.push_debug(command),
            Err(error) => debug!(%error, "debug input ignored"),
        }
    }

    /// Runs one iteration: inputs, timers, animation, events, display.
    pub fn step(&mut self) {
        self.iterations += 1;

        for event in self.arbiter.sample(self.engine.active_target()) {
            self.handle_input(event);
        }

        self.engine.tick();

        if let Some(AnimationKind::Countdown) = self
            .animations
            .poll(&mut self.scoreboard, self.engine.broadcaster_mut())
        {
            self.engine.start();
        }

        let changed = self.drain_engine_events();
        if self.refresh.poll() || changed {
            self.render();
        }
    }

    fn handle_input(&mut self, event: InputEvent) {
        match event {
            InputEvent::Start => self.request_start(),
            InputEvent::Reset => {
                self.animations.cancel();
                self.engine.reset();
            }
            InputEvent::Catch(target) => {
                self.engine.catch(target);
            }
        }
    }

    fn request_start(&mut self) {
        if self.engine.state() == GameState::Playing
            || self.animations.playing() == Some(AnimationKind::Countdown)
        {
            debug!("start ignored: round running or counting down");
            return;
        }
        if self.settings.countdown {
            self.animations.play(
                Animation::countdown(),
                &mut self.scoreboard,
                self.engine.broadcaster_mut(),
            );
        } else {
            self.animations.cancel();
            self.engine.start();
        }
    }

    /// Feeds queued engine events to the recorder and reacts to game over.
    /// Returns whether there were any.
    fn drain_engine_events(&mut self) -> bool {
        let events = self.engine.drain_events();
        for event in &events {
            self.recorder.record(event);
            if let EngineEvent::GameOver { score, .. } = *event {
                self.animations.play(
                    Animation::end_flash(score),
                    &mut self.scoreboard,
                    self.engine.broadcaster_mut(),
                );
            }
        }
        !events.is_empty()
    }

    fn render(&mut self) {
        if self.animations.playing().is_some() {
            return;
        }
        let panel = match self.engine.state() {
            GameState::Idle => Panel::idle(),
            GameState::Playing => Panel::playing(
                self.engine.game_remaining().unwrap_or_default(),
                self.engine.score(),
            ),
            GameState::GameOver => Panel::game_over(self.engine.score()),
        };
        self.scoreboard.render(&panel);
    }

    /// Runs until `cancel` fires, draining debug characters from `debug`
    /// at the top of each iteration.
    pub async fn run(
        mut self,
        mut debug: Option<mpsc::Receiver<char>>,
        cancel: CancellationToken,
    ) -> RunSummary {
        let mut ticker = tokio::time::interval(self.settings.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        info!(
            poll_ms = self.settings.poll_interval.as_millis(),
            "game loop running"
        );

        loop {
            tokio::select! {
                () = cancel.cancelled() => break,
                _ = ticker.tick() => {
                    if let Some(rx) = debug.as_mut() {
                        while let Ok(ch) = rx.try_recv() {
                            self.push_debug(ch);
                        }
                    }
                    self.step();
                }
            }
        }

        self.shutdown()
    }

    /// Darkens the indicators and reports where the game stood.
    pub fn shutdown(&mut self) -> RunSummary {
        self.animations.cancel();
        self.engine.broadcaster_mut().send(ActuatorCommand::Off);
        let summary = RunSummary {
            iterations: self.iterations,
            final_state: self.engine.state(),
            final_score: self.engine.score(),
        };
        info!(
            iterations = summary.iterations,
            state = %summary.final_state,
            score = summary.final_score,
            "game loop stopped"
        );
        summary
    }

    /// The engine, for inspection.
    #[must_use]
    pub const fn engine(&self) -> &GameEngine {
        &self.engine
    }

    /// Animation currently playing.
    #[must_use]
    pub fn animation(&self) -> Option<AnimationKind> {
        self.animations.playing()
    }

    /// Iterations executed so far.
    #[must_use]
    pub const fn iterations(&self) -> u64 {
        self.iterations
    }
}

impl std::fmt::Debug for GameLoop {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameLoop")
            .field("engine", &self.engine)
            .field("animation", &self.animations.playing())
            .field("iterations", &self.iterations)
            .finish_non_exhaustive()
    }
}
