//! In-memory board
//!
//! Pins are shared atomics, so a test (or a scripted host run) keeps a
//! handle to a pin and drives it while the game loop reads it. Displays are
//! attached by name before negotiation and handed out once.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU16, Ordering};

use crate::display::DisplaySink;
use crate::error::PeripheralError;

use crate::input::Polarity;

use super::negotiate::Board;
use super::{AnalogInput, DigitalInput, DigitalOutput};

/// Pin names broken out on the Nano ESP32 the game was wired on.
const NANO_ESP32_PINS: [&str; 24] = [
    "A0", "A1", "A2", "A3", "A4", "A5", "A6", "A7", "D2", "D3", "D4", "D5", "D6", "D7", "D8",
    "D9", "D10", "D11", "D12", "D13", "RX", "TX", "SCL", "SDA",
];

/// Shared digital level. Idles high until claimed as an input, which biases
/// it to the input's released level.
#[derive(Debug, Clone)]
pub struct VirtualLevel(Arc<AtomicBool>);

impl VirtualLevel {
    fn new(high: bool) -> Self {
        Self(Arc::new(AtomicBool::new(high)))
    }

    /// Drives the pin.
    pub fn set(&self, high: bool) {
        self.0.store(high, Ordering::SeqCst);
    }

    /// Current level.
    #[must_use]
    pub fn get(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

impl DigitalInput for VirtualLevel {
    fn read_level(&mut self) -> Result<bool, PeripheralError> {
        Ok(self.get())
    }
}

impl DigitalOutput for VirtualLevel {
    fn set_level(&mut self, high: bool) {
        self.set(high);
    }
}

/// Shared analog sample. Idles at full scale (no magnet present).
#[derive(Debug, Clone)]
pub struct VirtualReading(Arc<AtomicU16>);

impl VirtualReading {
    fn new(raw: u16) -> Self {
        Self(Arc::new(AtomicU16::new(raw)))
    }

    /// Sets the raw sample.
    pub fn set(&self, raw: u16) {
        self.0.store(raw, Ordering::SeqCst);
    }
}

impl AnalogInput for VirtualReading {
    fn read_raw(&mut self) -> Result<u16, PeripheralError> {
        Ok(self.0.load(Ordering::SeqCst))
    }
}

/// A board whose pins live in memory.
pub struct VirtualBoard {
    pins: BTreeSet<String>,
    levels: HashMap<String, VirtualLevel>,
    readings: HashMap<String, VirtualReading>,
    displays: HashMap<String, Box<dyn DisplaySink>>,
}

impl VirtualBoard {
    /// Creates a board exposing exactly `pins`.
    pub fn new<I, S>(pins: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            pins: pins.into_iter().map(Into::into).collect(),
            levels: HashMap::new(),
            readings: HashMap::new(),
            displays: HashMap::new(),
        }
    }

    /// Board with the Nano ESP32 pin names.
    #[must_use]
    pub fn nano_esp32() -> Self {
        Self::new(NANO_ESP32_PINS)
    }

    /// Makes a display available under `name`.
    #[must_use]
    pub fn with_display(mut self, name: impl Into<String>, sink: Box<dyn DisplaySink>) -> Self {
        self.displays.insert(name.into(), sink);
        self
    }

    /// Handle to a pin's digital level, created idle-high on first use.
    ///
    /// Returns `None` for a pin the board does not have.
    pub fn level(&mut self, pin: &str) -> Option<VirtualLevel> {
        if !self.pins.contains(pin) {
            return None;
        }
        Some(
            self.levels
                .entry(pin.to_string())
                .or_insert_with(|| VirtualLevel::new(true))
                .clone(),
        )
    }

    /// Handle to a pin's analog sample, created at full scale on first use.
    pub fn reading(&mut self, pin: &str) -> Option<VirtualReading> {
        if !self.pins.contains(pin) {
            return None;
        }
        Some(
            self.readings
                .entry(pin.to_string())
                .or_insert_with(|| VirtualReading::new(u16::MAX))
                .clone(),
        )
    }

    fn missing(pin: &str) -> PeripheralError {
        PeripheralError::unavailable(format!("pin {pin}"), "no such pin on this board")
    }
}

impl std::fmt::Debug for VirtualBoard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VirtualBoard")
            .field("pins", &self.pins)
            .field("displays", &self.displays.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

impl Board for VirtualBoard {
    fn digital_input(
        &mut self,
        pin: &str,
        polarity: Polarity,
    ) -> Result<Box<dyn DigitalInput>, PeripheralError> {
        let level = self.level(pin).ok_or_else(|| Self::missing(pin))?;
        level.set(polarity.released_level());
        Ok(Box::new(level))
    }

    fn analog_input(&mut self, pin: &str) -> Result<Box<dyn AnalogInput>, PeripheralError> {
        self.reading(pin)
            .map(|reading| Box::new(reading) as Box<dyn AnalogInput>)
            .ok_or_else(|| Self::missing(pin))
    }

    fn display(&mut self, name: &str) -> Result<Box<dyn DisplaySink>, PeripheralError> {
        self.displays.remove(name).ok_or_else(|| {
            PeripheralError::unavailable(format!("display {name}"), "no display attached")
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claim_biases_to_released_level() {
        let mut board = VirtualBoard::nano_esp32();
        assert!(board.level("A0").unwrap().get());
        let mut pull_up = board.digital_input("A0", Polarity::ActiveLow).unwrap();
        assert!(pull_up.read_level().unwrap());
        let mut pull_down = board.digital_input("A1", Polarity::ActiveHigh).unwrap();
        assert!(!pull_down.read_level().unwrap());
    }

    #[test]
    fn test_handles_share_state() {
        let mut board = VirtualBoard::nano_esp32();
        let mut pin = board.digital_input("D6", Polarity::ActiveLow).unwrap();
        board.level("D6").unwrap().set(false);
        assert!(!pin.read_level().unwrap());
    }

    #[test]
    fn test_unknown_pin_is_unavailable() {
        let mut board = VirtualBoard::nano_esp32();
        let err = board
            .digital_input("GPIO99", Polarity::ActiveLow)
            .err()
            .unwrap();
        assert!(err.to_string().contains("GPIO99"));
        assert!(board.level("GPIO99").is_none());
    }

    #[test]
    fn test_analog_idles_full_scale() {
        let mut board = VirtualBoard::new(["A3"]);
        let mut adc = board.analog_input("A3").unwrap();
        assert_eq!(adc.read_raw().unwrap(), u16::MAX);
        board.reading("A3").unwrap().set(1200);
        assert_eq!(adc.read_raw().unwrap(), 1200);
    }

    #[test]
    fn test_display_handed_out_once() {
        let mut board = VirtualBoard::new(Vec::<String>::new())
            .with_display("time", Box::new(crate::display::MemoryDisplay::new()));
        assert!(board.display("time").is_ok());
        assert!(board.display("time").is_err());
    }
}
