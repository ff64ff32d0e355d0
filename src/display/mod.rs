//! Display boundary
//!
//! The game draws through a fixed four-call contract modelled on a
//! four-digit seven-segment driver: `show`, `number`, `numbers` and
//! `set_cursor` (used by character LCDs, ignored by segment displays).
//! What to draw is decided by the [`Scoreboard`]; drivers only render.

pub mod console;
pub mod memory;
pub mod scoreboard;

pub use console::ConsoleDisplay;
pub use memory::{DisplayOp, MemoryDisplay};
pub use scoreboard::{DisplayHandles, Panel, PanelText, Scoreboard};

/// A display driver.
///
/// Calls are infallible: a driver that loses its bus drops the frame.
pub trait DisplaySink: Send {
    /// Shows up to four characters (segment) or a run of text at the cursor.
    fn show(&mut self, text: &str);

    /// Shows a right-aligned integer.
    fn number(&mut self, value: i32);

    /// Shows two zero-padded two-digit values, optionally with a colon.
    fn numbers(&mut self, left: u8, right: u8, colon: bool);

    /// Moves the cursor; only meaningful on character displays.
    fn set_cursor(&mut self, col: u8, row: u8);
}

/// Width of a segment display in characters.
pub const SEGMENT_WIDTH: usize = 4;

/// Renders `number(value)` the way a four-digit display shows it.
#[must_use]
pub fn format_number(value: i32) -> String {
    format!("{value:>4}")
}

/// Renders `numbers(left, right, colon)`.
#[must_use]
pub fn format_numbers(left: u8, right: u8, colon: bool) -> String {
    let sep = if colon { ':' } else { ' ' };
    format!("{left:02}{sep}{right:02}")
}
