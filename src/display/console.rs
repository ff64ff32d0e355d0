//! Terminal display for host runs.

use std::io::Write;

use super::{DisplaySink, format_number, format_numbers};

/// Writes `[label] text` to a stream whenever the rendered text changes.
pub struct ConsoleDisplay {
    label: String,
    writer: Box<dyn Write + Send>,
    last: Option<String>,
}

impl ConsoleDisplay {
    /// Display writing to stdout.
    #[must_use]
    pub fn stdout(label: impl Into<String>) -> Self {
        Self::new(label, Box::new(std::io::stdout()))
    }

    /// Display writing to any stream.
    #[must_use]
    pub fn new(label: impl Into<String>, writer: Box<dyn Write + Send>) -> Self {
        Self {
            label: label.into(),
            writer,
            last: None,
        }
    }

    fn emit(&mut self, text: String) {
        if self.last.as_deref() == Some(text.as_str()) {
            return;
        }
        // A closed terminal just stops receiving frames.
        let _ = writeln!(self.writer, "[{}] {}", self.label, text);
        let _ = self.writer.flush();
        self.last = Some(text);
    }
}

impl std::fmt::Debug for ConsoleDisplay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConsoleDisplay")
            .field("label", &self.label)
            .field("last", &self.last)
            .finish_non_exhaustive()
    }
}

impl DisplaySink for ConsoleDisplay {
    fn show(&mut self, text: &str) {
        self.emit(text.to_string());
    }

    fn number(&mut self, value: i32) {
        self.emit(format_number(value));
    }

    fn numbers(&mut self, left: u8, right: u8, colon: bool) {
        self.emit(format_numbers(left, right, colon));
    }

    fn set_cursor(&mut self, _col: u8, _row: u8) {}
}
