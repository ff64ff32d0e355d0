//! Configuration schema
//!
//! Every field has a default, so an empty file (or `{}`) is a complete
//! configuration for the five-target board the game was built on.

use std::net::SocketAddr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::input::Polarity;

// ============================================================================
// Root
// ============================================================================

/// Root configuration document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GameConfig {
    /// Round timing and target count
    pub game: GameSection,
    /// Control loop pacing
    #[serde(rename = "loop")]
    pub game_loop: LoopSection,
    /// Buttons and sensors
    pub inputs: InputsConfig,
    /// Display layout and names
    pub display: DisplayConfig,
    /// Broadcast link to the remote indicators
    pub radio: RadioConfig,
}

// ============================================================================
// Sections
// ============================================================================

/// `game:` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GameSection {
    /// Length of a round
    #[serde(with = "duration")]
    pub duration: Duration,
    /// Time allowed per target
    #[serde(with = "duration")]
    pub target_duration: Duration,
    /// Number of target positions
    pub targets: u8,
    /// Play the countdown animation before a round
    pub countdown: bool,
    /// Scoreboard refresh period
    #[serde(with = "duration")]
    pub display_refresh: Duration,
}

impl Default for GameSection {
    fn default() -> Self {
        Self {
            duration: Duration::from_secs(30),
            target_duration: Duration::from_secs(5),
            targets: 5,
            countdown: true,
            display_refresh: Duration::from_millis(100),
        }
    }
}

/// `loop:` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoopSection {
    /// Sleep between iterations
    #[serde(with = "duration")]
    pub poll_interval: Duration,
}

impl Default for LoopSection {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(10),
        }
    }
}

/// `inputs:` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InputsConfig {
    /// Start button
    pub start_button: ButtonConfig,
    /// Reset button
    pub reset_button: ButtonConfig,
    /// One sensor per target, in target order
    pub sensors: Vec<SensorConfig>,
}

impl Default for InputsConfig {
    fn default() -> Self {
        Self {
            start_button: ButtonConfig::on("A0"),
            reset_button: ButtonConfig::on("A1"),
            sensors: ["A2", "SCL", "A6", "D6", "RX"]
                .into_iter()
                .map(|pin| SensorConfig::Digital {
                    pin: pin.to_string(),
                    polarity: Polarity::ActiveLow,
                })
                .collect(),
        }
    }
}

/// A push button.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ButtonConfig {
    /// Board pin name
    pub pin: String,
    /// Pressed level
    #[serde(default)]
    pub polarity: Polarity,
}

impl ButtonConfig {
    fn on(pin: &str) -> Self {
        Self {
            pin: pin.to_string(),
            polarity: Polarity::ActiveLow,
        }
    }
}

/// Default analog threshold: half scale of a 16-bit reading.
pub const DEFAULT_ANALOG_THRESHOLD: u16 = 30_000;

const fn default_threshold() -> u16 {
    DEFAULT_ANALOG_THRESHOLD
}

/// A target sensor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SensorConfig {
    /// Hall switch with a digital output
    Digital {
        /// Board pin name
        pin: String,
        /// Level that means "magnet near"
        #[serde(default)]
        polarity: Polarity,
    },
    /// Linear hall sensor on an ADC pin
    Analog {
        /// Board pin name
        pin: String,
        /// Readings below this mean "magnet near"
        #[serde(default = "default_threshold")]
        threshold: u16,
    },
}

impl SensorConfig {
    /// Pin the sensor is wired to.
    #[must_use]
    pub fn pin(&self) -> &str {
        match self {
            Self::Digital { pin, .. } | Self::Analog { pin, .. } => pin,
        }
    }
}

/// Display hardware layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplayLayout {
    /// Two four-digit seven-segment displays
    #[default]
    Segment,
    /// One 16x2 character LCD
    Character,
}

/// `display:` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DisplayConfig {
    /// Layout
    pub layout: DisplayLayout,
    /// Time display name (segment layout)
    pub time: String,
    /// Score display name (segment layout)
    pub score: String,
    /// LCD name (character layout)
    pub lcd: String,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            layout: DisplayLayout::Segment,
            time: "time".to_string(),
            score: "score".to_string(),
            lcd: "lcd".to_string(),
        }
    }
}

/// `radio:` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RadioConfig {
    /// Open the link at all
    pub enabled: bool,
    /// Local address to bind
    pub bind: SocketAddr,
    /// Broadcast destination
    pub broadcast: SocketAddr,
}

impl Default for RadioConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            bind: SocketAddr::from(([0, 0, 0, 0], 0)),
            broadcast: SocketAddr::from(([255, 255, 255, 255], 4210)),
        }
    }
}

// ============================================================================
// Duration (de)serialization
// ============================================================================

/// Durations as humantime strings (`30s`, `100ms`) or integer milliseconds.
mod duration {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer, de};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Millis(i64),
        Text(String),
    }

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&humantime::format_duration(*value).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        match Raw::deserialize(deserializer)? {
            Raw::Millis(ms) => u64::try_from(ms)
                .map(Duration::from_millis)
                .map_err(|_| de::Error::custom(format!("duration cannot be negative ({ms} ms)"))),
            Raw::Text(text) => {
                let text = text.trim();
                if text.starts_with('-') {
                    return Err(de::Error::custom(format!(
                        "duration cannot be negative ({text})"
                    )));
                }
                humantime::parse_duration(text)
                    .map_err(|e| de::Error::custom(format!("invalid duration '{text}': {e}")))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_mapping_is_default() {
        let config: GameConfig = serde_yaml::from_str("{}").unwrap();
        assert_eq!(config, GameConfig::default());
        assert_eq!(config.game.duration, Duration::from_secs(30));
        assert_eq!(config.game.target_duration, Duration::from_secs(5));
        assert_eq!(config.game.targets, 5);
        assert_eq!(config.inputs.sensors.len(), 5);
        assert_eq!(config.inputs.sensors[1].pin(), "SCL");
    }

    #[test]
    fn durations_accept_text_and_millis() {
        let config: GameConfig = serde_yaml::from_str(
            "game:\n  duration: 1m\n  target_duration: 2500\nloop:\n  poll_interval: 5ms\n",
        )
        .unwrap();
        assert_eq!(config.game.duration, Duration::from_secs(60));
        assert_eq!(config.game.target_duration, Duration::from_millis(2500));
        assert_eq!(config.game_loop.poll_interval, Duration::from_millis(5));
    }

    #[test]
    fn negative_durations_are_rejected() {
        assert!(serde_yaml::from_str::<GameConfig>("game:\n  duration: -5\n").is_err());
        let err = serde_yaml::from_str::<GameConfig>("game:\n  duration: \"-5s\"\n").unwrap_err();
        assert!(err.to_string().contains("negative"));
    }

    #[test]
    fn sensors_are_tagged_by_kind() {
        let config: GameConfig = serde_yaml::from_str(
            "inputs:\n  sensors:\n    - { kind: digital, pin: D2, polarity: active_high }\n    - { kind: analog, pin: A3 }\n",
        )
        .unwrap();
        assert_eq!(
            config.inputs.sensors,
            vec![
                SensorConfig::Digital {
                    pin: "D2".to_string(),
                    polarity: Polarity::ActiveHigh
                },
                SensorConfig::Analog {
                    pin: "A3".to_string(),
                    threshold: DEFAULT_ANALOG_THRESHOLD
                },
            ]
        );
    }

    #[test]
    fn unknown_fields_are_rejected() {
        assert!(serde_yaml::from_str::<GameConfig>("game:\n  targetz: 4\n").is_err());
    }

    #[test]
    fn serialized_default_reloads() {
        let yaml = serde_yaml::to_string(&GameConfig::default()).unwrap();
        let config: GameConfig = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(config, GameConfig::default());
    }
}
