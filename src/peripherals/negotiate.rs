//! Startup negotiation
//!
//! Turns the `inputs` and `display` configuration into typed optional
//! handles. Every failure is logged once here and the capability is left
//! out; nothing downstream ever sees a [`PeripheralError`] from setup.

use tracing::{info, warn};

use crate::config::{ButtonConfig, DisplayConfig, DisplayLayout, GameConfig, SensorConfig};
use crate::display::{DisplayHandles, DisplaySink};
use crate::error::PeripheralError;
use crate::input::Polarity;
use crate::transport::BroadcastLink;

use super::{AnalogInput, DigitalInput};

/// Source of pins and displays.
///
/// Implemented by [`VirtualBoard`](super::VirtualBoard) on the host; a board
/// support crate implements it over real GPIO.
pub trait Board {
    /// Claims a pin as a digital input biased to the released level of
    /// `polarity` (pull-up for active-low, pull-down for active-high).
    ///
    /// # Errors
    ///
    /// Returns [`PeripheralError`] if the pin does not exist or is in use.
    fn digital_input(
        &mut self,
        pin: &str,
        polarity: Polarity,
    ) -> Result<Box<dyn DigitalInput>, PeripheralError>;

    /// Claims a pin as an analog input.
    ///
    /// # Errors
    ///
    /// Returns [`PeripheralError`] if the pin does not exist or has no ADC.
    fn analog_input(&mut self, pin: &str) -> Result<Box<dyn AnalogInput>, PeripheralError>;

    /// Claims a display by name.
    ///
    /// # Errors
    ///
    /// Returns [`PeripheralError`] if no such display is attached.
    fn display(&mut self, name: &str) -> Result<Box<dyn DisplaySink>, PeripheralError>;
}

// ============================================================================
// Sensors
// ============================================================================

/// A target sensor, digital or analog.
pub enum SensorInput {
    /// Binary hall switch; near is the asserted level.
    Digital {
        /// Pin handle
        pin: Box<dyn DigitalInput>,
        /// Which level counts as near
        polarity: Polarity,
    },
    /// Linear hall sensor; near is a reading below the threshold.
    Analog {
        /// ADC handle
        adc: Box<dyn AnalogInput>,
        /// Readings strictly below this are near
        threshold: u16,
    },
}

impl SensorInput {
    /// Samples the sensor.
    ///
    /// # Errors
    ///
    /// Propagates the read failure of the underlying pin.
    pub fn is_near(&mut self) -> Result<bool, PeripheralError> {
        match self {
            Self::Digital { pin, polarity } => Ok(polarity.is_asserted(pin.read_level()?)),
            Self::Analog { adc, threshold } => Ok(adc.read_raw()? < *threshold),
        }
    }
}

impl std::fmt::Debug for SensorInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Digital { polarity, .. } => f
                .debug_struct("Digital")
                .field("polarity", polarity)
                .finish_non_exhaustive(),
            Self::Analog { threshold, .. } => f
                .debug_struct("Analog")
                .field("threshold", threshold)
                .finish_non_exhaustive(),
        }
    }
}

// ============================================================================
// Negotiated set
// ============================================================================

/// Everything the game could bring up.
pub struct Peripherals {
    /// Start button, with its polarity
    pub start_button: Option<(Box<dyn DigitalInput>, Polarity)>,
    /// Reset button, with its polarity
    pub reset_button: Option<(Box<dyn DigitalInput>, Polarity)>,
    /// One slot per target; `None` where the sensor is missing
    pub sensors: Vec<Option<SensorInput>>,
    /// Score and time displays
    pub displays: DisplayHandles,
    /// Broadcast link to the remote indicators
    pub radio: Option<Box<dyn BroadcastLink>>,
}

impl Peripherals {
    /// A set with nothing attached, for `targets` targets.
    #[must_use]
    pub fn none(targets: usize) -> Self {
        Self {
            start_button: None,
            reset_button: None,
            sensors: (0..targets).map(|_| None).collect(),
            displays: DisplayHandles::Segment {
                time: None,
                score: None,
            },
            radio: None,
        }
    }

    /// Attaches the outcome of opening the radio.
    #[must_use]
    pub fn with_radio(mut self, radio: Result<Box<dyn BroadcastLink>, PeripheralError>) -> Self {
        self.radio = available(radio);
        self
    }

    /// Number of target slots that have a working sensor.
    #[must_use]
    pub fn sensor_count(&self) -> usize {
        self.sensors.iter().filter(|s| s.is_some()).count()
    }
}

impl std::fmt::Debug for Peripherals {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Peripherals")
            .field("start_button", &self.start_button.is_some())
            .field("reset_button", &self.reset_button.is_some())
            .field("sensors", &self.sensor_count())
            .field("radio", &self.radio.is_some())
            .finish_non_exhaustive()
    }
}

fn available<T>(result: Result<T, PeripheralError>) -> Option<T> {
    match result {
        Ok(handle) => Some(handle),
        Err(error) => {
            warn!(%error, "capability disabled");
            None
        }
    }
}

/// Brings up every configured peripheral on `board`.
///
/// The radio is opened separately (it needs the async runtime) and added
/// with [`Peripherals::with_radio`].
pub fn negotiate(config: &GameConfig, board: &mut dyn Board) -> Peripherals {
    let inputs = &config.inputs;
    let targets = usize::from(config.game.targets);

    let start_button = claim_button(board, &inputs.start_button);
    let reset_button = claim_button(board, &inputs.reset_button);

    let mut sensors = Vec::with_capacity(targets);
    for index in 0..targets {
        let sensor = match inputs.sensors.get(index) {
            Some(SensorConfig::Digital { pin, polarity }) => {
                available(board.digital_input(pin, *polarity)).map(|pin| SensorInput::Digital {
                    pin,
                    polarity: *polarity,
                })
            }
            Some(SensorConfig::Analog { pin, threshold }) => available(board.analog_input(pin))
                .map(|adc| SensorInput::Analog {
                    adc,
                    threshold: *threshold,
                }),
            None => {
                warn!(target_number = index + 1, "no sensor configured for target");
                None
            }
        };
        sensors.push(sensor);
    }

    let displays = negotiate_displays(&config.display, board);

    let peripherals = Peripherals {
        start_button,
        reset_button,
        sensors,
        displays,
        radio: None,
    };
    info!(
        start_button = peripherals.start_button.is_some(),
        reset_button = peripherals.reset_button.is_some(),
        sensors = peripherals.sensor_count(),
        targets,
        "peripherals negotiated"
    );
    peripherals
}

fn claim_button(
    board: &mut dyn Board,
    button: &ButtonConfig,
) -> Option<(Box<dyn DigitalInput>, Polarity)> {
    available(board.digital_input(&button.pin, button.polarity)).map(|pin| (pin, button.polarity))
}

fn negotiate_displays(config: &DisplayConfig, board: &mut dyn Board) -> DisplayHandles {
    match config.layout {
        DisplayLayout::Segment => DisplayHandles::Segment {
            time: available(board.display(&config.time)),
            score: available(board.display(&config.score)),
        },
        DisplayLayout::Character => DisplayHandles::Character {
            lcd: available(board.display(&config.lcd)),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::MemoryDisplay;
    use crate::peripherals::VirtualBoard;

    fn board_with_displays() -> VirtualBoard {
        VirtualBoard::nano_esp32()
            .with_display("time", Box::new(MemoryDisplay::new()))
            .with_display("score", Box::new(MemoryDisplay::new()))
    }

    #[test]
    fn test_default_config_negotiates_everything() {
        let config = GameConfig::default();
        let mut board = board_with_displays();
        let peripherals = negotiate(&config, &mut board);

        assert!(peripherals.start_button.is_some());
        assert!(peripherals.reset_button.is_some());
        assert_eq!(peripherals.sensor_count(), 5);
        assert!(matches!(
            peripherals.displays,
            DisplayHandles::Segment {
                time: Some(_),
                score: Some(_)
            }
        ));
        assert!(peripherals.radio.is_none());
    }

    #[test]
    fn test_missing_pin_leaves_slot_empty() {
        let config = GameConfig::default();
        // Drop D6, the fourth sensor's pin.
        let mut board = VirtualBoard::new([
            "A0", "A1", "A2", "A3", "A6", "SCL", "RX",
        ]);
        let peripherals = negotiate(&config, &mut board);

        assert_eq!(peripherals.sensor_count(), 4);
        assert!(peripherals.sensors[3].is_none());
        assert!(peripherals.sensors[4].is_some());
    }

    #[test]
    fn test_missing_display_is_none() {
        let config = GameConfig::default();
        let mut board = VirtualBoard::nano_esp32();
        let peripherals = negotiate(&config, &mut board);
        assert!(matches!(
            peripherals.displays,
            DisplayHandles::Segment {
                time: None,
                score: None
            }
        ));
    }

    #[test]
    fn test_with_radio_error_disables_radio() {
        let peripherals = Peripherals::none(5)
            .with_radio(Err(PeripheralError::unavailable("radio", "no interface")));
        assert!(peripherals.radio.is_none());
    }

    #[test]
    fn test_analog_sensor_threshold() {
        let mut board = VirtualBoard::new(["A3"]);
        let reading = board.reading("A3").unwrap();
        let mut sensor = SensorInput::Analog {
            adc: board.analog_input("A3").unwrap(),
            threshold: 30_000,
        };
        assert!(!sensor.is_near().unwrap());
        reading.set(30_000);
        assert!(!sensor.is_near().unwrap());
        reading.set(29_999);
        assert!(sensor.is_near().unwrap());
    }

    #[test]
    fn test_digital_sensor_active_low() {
        let mut board = VirtualBoard::new(["D6"]);
        let level = board.level("D6").unwrap();
        let mut sensor = SensorInput::Digital {
            pin: board.digital_input("D6", Polarity::ActiveLow).unwrap(),
            polarity: Polarity::ActiveLow,
        };
        assert!(!sensor.is_near().unwrap());
        level.set(false);
        assert!(sensor.is_near().unwrap());
    }

    #[test]
    fn test_active_high_inputs_idle_released() {
        let mut config = GameConfig::default();
        config.inputs.start_button.polarity = Polarity::ActiveHigh;
        config.inputs.reset_button.polarity = Polarity::ActiveHigh;
        for sensor in &mut config.inputs.sensors {
            if let SensorConfig::Digital { polarity, .. } = sensor {
                *polarity = Polarity::ActiveHigh;
            }
        }
        let mut board = board_with_displays();
        let mut peripherals = negotiate(&config, &mut board);

        for sensor in peripherals.sensors.iter_mut().flatten() {
            assert!(!sensor.is_near().unwrap());
        }
        let (start, polarity) = peripherals.start_button.as_mut().unwrap();
        assert!(!polarity.is_asserted(start.read_level().unwrap()));

        board.level("A0").unwrap().set(true);
        assert!(polarity.is_asserted(start.read_level().unwrap()));
    }
}
