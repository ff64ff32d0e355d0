//! Configuration validation
//!
//! Runs on the deserialized [`GameConfig`] and collects every issue rather
//! than stopping at the first, so one `validate` run shows everything that
//! needs fixing.

use std::collections::HashMap;
use std::time::Duration;

use crate::config::schema::{DisplayLayout, GameConfig, SensorConfig};
use crate::error::{Severity, ValidationIssue};
use crate::timer::MAX_DURATION_MS;

/// Largest target count the single-digit wire vocabulary can address.
pub const MAX_TARGETS: u8 = 9;

/// Result of configuration validation.
#[derive(Debug, Default)]
pub struct ValidationResult {
    /// Validation errors (prevent loading).
    pub errors: Vec<ValidationIssue>,

    /// Validation warnings (informational).
    pub warnings: Vec<ValidationIssue>,
}

impl ValidationResult {
    /// Returns `true` if validation passed (no errors).
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Configuration validator.
#[derive(Debug, Default)]
pub struct Validator {
    errors: Vec<ValidationIssue>,
    warnings: Vec<ValidationIssue>,
}

impl Validator {
    /// Creates a new validator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates a configuration and returns every issue found.
    pub fn validate(&mut self, config: &GameConfig) -> ValidationResult {
        self.errors.clear();
        self.warnings.clear();

        self.validate_game(config);
        self.validate_loop(config);
        self.validate_inputs(config);
        self.validate_display(config);
        self.validate_radio(config);

        ValidationResult {
            errors: std::mem::take(&mut self.errors),
            warnings: std::mem::take(&mut self.warnings),
        }
    }

    // ========================================================================
    // Sections
    // ========================================================================

    fn validate_game(&mut self, config: &GameConfig) {
        let game = &config.game;

        if game.targets < 2 {
            self.add_error(
                "game.targets",
                format!("at least 2 targets required, got {}", game.targets),
            );
        } else if game.targets > MAX_TARGETS {
            self.add_error(
                "game.targets",
                format!(
                    "at most {MAX_TARGETS} targets supported (single-digit commands), got {}",
                    game.targets
                ),
            );
        }

        self.check_duration("game.duration", game.duration);
        self.check_duration("game.target_duration", game.target_duration);
        self.check_duration("game.display_refresh", game.display_refresh);

        if !game.target_duration.is_zero() && game.target_duration >= game.duration {
            self.add_warning(
                "game.target_duration",
                "target duration is not shorter than the round; every round holds a single target",
            );
        }
    }

    fn validate_loop(&mut self, config: &GameConfig) {
        let poll = config.game_loop.poll_interval;
        self.check_duration("loop.poll_interval", poll);

        if !poll.is_zero() && poll >= config.game.target_duration {
            self.add_error(
                "loop.poll_interval",
                "poll interval must be shorter than the target duration",
            );
        }
        if !poll.is_zero() && poll > config.game.display_refresh {
            self.add_warning(
                "loop.poll_interval",
                "poll interval is longer than the display refresh; refreshes will be late",
            );
        }
    }

    fn validate_inputs(&mut self, config: &GameConfig) {
        let inputs = &config.inputs;
        let targets = usize::from(config.game.targets);

        if inputs.sensors.len() > targets {
            self.add_error(
                "inputs.sensors",
                format!(
                    "{} sensors configured for {targets} targets",
                    inputs.sensors.len()
                ),
            );
        } else if inputs.sensors.len() < targets {
            self.add_warning(
                "inputs.sensors",
                format!(
                    "only {} of {targets} targets have a sensor; the rest can only time out",
                    inputs.sensors.len()
                ),
            );
        }

        for (index, sensor) in inputs.sensors.iter().enumerate() {
            if let SensorConfig::Analog { threshold: 0, .. } = sensor {
                self.add_warning(
                    &format!("inputs.sensors[{index}].threshold"),
                    "threshold 0 can never be reached; this sensor will never trigger",
                );
            }
        }

        let mut pins = vec![
            (
                inputs.start_button.pin.as_str(),
                "inputs.start_button.pin".to_string(),
            ),
            (
                inputs.reset_button.pin.as_str(),
                "inputs.reset_button.pin".to_string(),
            ),
        ];
        for (index, sensor) in inputs.sensors.iter().enumerate() {
            pins.push((sensor.pin(), format!("inputs.sensors[{index}].pin")));
        }

        let mut claimed: HashMap<&str, &str> = HashMap::new();
        for (pin, path) in &pins {
            if pin.trim().is_empty() {
                self.add_error(path, "pin name cannot be empty");
            } else if let Some(first) = claimed.get(pin) {
                self.add_error(path, format!("pin '{pin}' already used by {first}"));
            } else {
                claimed.insert(*pin, path.as_str());
            }
        }
    }

    fn validate_display(&mut self, config: &GameConfig) {
        let display = &config.display;
        let names = match display.layout {
            DisplayLayout::Segment => vec![
                ("display.time", display.time.as_str()),
                ("display.score", display.score.as_str()),
            ],
            DisplayLayout::Character => vec![("display.lcd", display.lcd.as_str())],
        };
        for (path, name) in names {
            if name.trim().is_empty() {
                self.add_error(path, "display name cannot be empty");
            }
        }
    }

    fn validate_radio(&mut self, config: &GameConfig) {
        if config.radio.enabled && config.radio.broadcast.port() == 0 {
            self.add_error("radio.broadcast", "broadcast port cannot be 0");
        }
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    fn check_duration(&mut self, path: &str, value: Duration) {
        if value.is_zero() {
            self.add_error(path, "duration must be greater than zero");
        } else if value.as_millis() > u128::from(MAX_DURATION_MS) {
            self.add_error(
                path,
                format!("duration exceeds the {MAX_DURATION_MS} ms tick window"),
            );
        } else if value.subsec_nanos() % 1_000_000 != 0 {
            self.add_warning(path, "sub-millisecond precision is truncated");
        }
    }

    fn add_error(&mut self, path: &str, message: impl Into<String>) {
        self.errors.push(ValidationIssue {
            path: path.to_string(),
            message: message.into(),
            severity: Severity::Error,
        });
    }

    fn add_warning(&mut self, path: &str, message: impl Into<String>) {
        self.warnings.push(ValidationIssue {
            path: path.to_string(),
            message: message.into(),
            severity: Severity::Warning,
        });
    }
}
