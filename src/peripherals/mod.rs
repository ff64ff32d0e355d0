//! Peripheral boundary
//!
//! Narrow capability traits for the hardware the game touches, and the
//! startup negotiation that turns configuration into a set of optional
//! handles. Anything that fails to come up is logged and left as `None`;
//! the engine and the loop branch on presence, never on errors.

pub mod negotiate;
pub mod virtual_board;

pub use negotiate::{Board, Peripherals, SensorInput, negotiate};
pub use virtual_board::{VirtualBoard, VirtualLevel, VirtualReading};

use crate::error::PeripheralError;

/// A logical 0/1 input pin.
pub trait DigitalInput: Send {
    /// Reads the current logical level (`true` = high).
    ///
    /// # Errors
    ///
    /// Returns [`PeripheralError`] if the pin can no longer be read.
    fn read_level(&mut self) -> Result<bool, PeripheralError>;
}

/// A raw analog input (ADC channel).
pub trait AnalogInput: Send {
    /// Reads a raw 16-bit sample.
    ///
    /// # Errors
    ///
    /// Returns [`PeripheralError`] if the converter can no longer be read.
    fn read_raw(&mut self) -> Result<u16, PeripheralError>;
}

/// A digital output such as an indicator LED.
pub trait DigitalOutput: Send {
    /// Drives the output high (`true`) or low.
    fn set_level(&mut self, high: bool);
}
