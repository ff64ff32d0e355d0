//! Shared integration-test harness: an in-process game rig on a manual
//! clock, and helpers for running the `fishing-game` binary.

#![allow(dead_code)]

use std::collections::HashMap;
use std::path::PathBuf;
use std::process::{Command, Output};
use std::sync::Arc;

use fishing_game::actuator::ActuatorBroadcaster;
use fishing_game::config::{GameConfig, SensorConfig};
use fishing_game::display::{MemoryDisplay, Scoreboard};
use fishing_game::engine::{EngineSettings, GameEngine, GameState};
use fishing_game::input::{InputArbiter, Polarity};
use fishing_game::observability::GameRecorder;
use fishing_game::peripherals::{VirtualBoard, negotiate};
use fishing_game::runtime::{GameLoop, LoopSettings};
use fishing_game::timer::ManualClock;
use fishing_game::transport::MemoryLink;

/// Loop period the rig steps with.
pub const STEP_MS: u32 = 10;

/// A complete game wired to in-memory peripherals.
pub struct Rig {
    pub game: GameLoop,
    pub clock: Arc<ManualClock>,
    pub link: MemoryLink,
    pub time: MemoryDisplay,
    pub score: MemoryDisplay,
    board: VirtualBoard,
    sensor_pins: Vec<String>,
    start_pin: String,
    reset_pin: String,
    polarities: HashMap<String, Polarity>,
}

impl Rig {
    /// Builds a rig from `config` with a fixed target sequence.
    #[allow(clippy::missing_panics_doc)]
    pub fn new(config: &GameConfig, seed: u64) -> Self {
        let clock = ManualClock::shared(0);
        let link = MemoryLink::new();
        let time = MemoryDisplay::new();
        let score = MemoryDisplay::new();

        let mut board = VirtualBoard::nano_esp32()
            .with_display(config.display.time.clone(), Box::new(time.clone()))
            .with_display(config.display.score.clone(), Box::new(score.clone()));
        let mut peripherals = negotiate(config, &mut board);

        let settings = EngineSettings::from_config(config, Some(seed));
        let engine = GameEngine::new(
            &settings,
            clock.clone(),
            ActuatorBroadcaster::new(Some(Box::new(link.clone()))),
        )
        .expect("engine should build");
        let arbiter = InputArbiter::from_peripherals(&mut peripherals);
        let scoreboard = Scoreboard::new(peripherals.displays);
        let recorder = GameRecorder::new(None, settings.targets);

        let game = GameLoop::new(
            engine,
            arbiter,
            scoreboard,
            recorder,
            clock.clone(),
            LoopSettings::from_config(config),
        )
        .expect("loop should build");

        Self {
            game,
            clock,
            link,
            time,
            score,
            board,
            sensor_pins: config
                .inputs
                .sensors
                .iter()
                .map(|s| s.pin().to_string())
                .collect(),
            start_pin: config.inputs.start_button.pin.clone(),
            reset_pin: config.inputs.reset_button.pin.clone(),
            polarities: input_polarities(config),
        }
    }

    /// Rig with the stock configuration.
    pub fn with_defaults(seed: u64) -> Self {
        Self::new(&GameConfig::default(), seed)
    }

    /// Advances the clock by `millis` in loop-sized steps, running the loop
    /// after each step.
    pub fn run_for(&mut self, millis: u32) {
        let mut left = millis;
        while left > 0 {
            let step = left.min(STEP_MS);
            self.clock.advance(step);
            self.game.step();
            left -= step;
        }
    }

    /// Drives a digital input to its asserted level.
    #[allow(clippy::missing_panics_doc)]
    pub fn hold(&mut self, pin: &str) {
        let released = self.polarity(pin).released_level();
        self.board.level(pin).expect("pin exists").set(!released);
    }

    /// Returns a digital input to its released level.
    #[allow(clippy::missing_panics_doc)]
    pub fn release(&mut self, pin: &str) {
        let released = self.polarity(pin).released_level();
        self.board.level(pin).expect("pin exists").set(released);
    }

    fn polarity(&self, pin: &str) -> Polarity {
        self.polarities.get(pin).copied().unwrap_or_default()
    }

    /// Press and release, one loop step each.
    pub fn tap(&mut self, pin: &str) {
        let pin = pin.to_string();
        self.hold(&pin);
        self.run_for(STEP_MS);
        self.release(&pin);
        self.run_for(STEP_MS);
    }

    pub fn press_start(&mut self) {
        let pin = self.start_pin.clone();
        self.tap(&pin);
    }

    pub fn press_reset(&mut self) {
        let pin = self.reset_pin.clone();
        self.tap(&pin);
    }

    /// Pin of the sensor under the active target.
    #[allow(clippy::missing_panics_doc)]
    pub fn active_sensor(&self) -> String {
        let target = self.game.engine().active_target().expect("a target is active");
        self.sensor_pins[target.index()].clone()
    }

    /// Brings the magnet to the active target and takes it away again.
    pub fn catch_active(&mut self) {
        let pin = self.active_sensor();
        self.tap(&pin);
    }

    pub fn state(&self) -> GameState {
        self.game.engine().state()
    }
}

fn input_polarities(config: &GameConfig) -> HashMap<String, Polarity> {
    let inputs = &config.inputs;
    let mut polarities: HashMap<String, Polarity> = inputs
        .sensors
        .iter()
        .filter_map(|sensor| match sensor {
            SensorConfig::Digital { pin, polarity } => Some((pin.clone(), *polarity)),
            SensorConfig::Analog { .. } => None,
        })
        .collect();
    for button in [&inputs.start_button, &inputs.reset_button] {
        polarities.insert(button.pin.clone(), button.polarity);
    }
    polarities
}

// ============================================================================
// Binary helpers
// ============================================================================

/// Path to a file under `tests/fixtures/`.
pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

/// Runs the binary to completion with `args`.
#[allow(clippy::missing_panics_doc)]
pub fn run_command(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_fishing-game"))
        .args(args)
        .env_remove("FISHING_GAME_CONFIG")
        .env_remove("FISHING_GAME_LOG_LEVEL")
        .output()
        .expect("failed to run fishing-game")
}
