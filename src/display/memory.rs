//! Recording display for tests and headless runs.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::{DisplaySink, format_number, format_numbers};

const LCD_COLS: usize = 16;
const LCD_ROWS: usize = 2;

/// A call made on a [`MemoryDisplay`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayOp {
    /// `show(text)`
    Show(String),
    /// `number(value)`
    Number(i32),
    /// `numbers(left, right, colon)`
    Numbers(u8, u8, bool),
    /// `set_cursor(col, row)`
    Cursor(u8, u8),
}

#[derive(Debug)]
struct State {
    ops: Vec<DisplayOp>,
    text: String,
    cursor: (usize, usize),
    rows: Vec<Vec<char>>,
}

impl Default for State {
    fn default() -> Self {
        Self {
            ops: Vec::new(),
            text: String::new(),
            cursor: (0, 0),
            rows: vec![vec![' '; LCD_COLS]; LCD_ROWS],
        }
    }
}

impl State {
    fn write(&mut self, text: String) {
        let (col, row) = self.cursor;
        if let Some(cells) = self.rows.get_mut(row) {
            for (offset, ch) in text.chars().enumerate() {
                if let Some(cell) = cells.get_mut(col + offset) {
                    *cell = ch;
                }
            }
        }
        self.cursor.0 = col + text.chars().count();
        self.text = text;
    }
}

/// Display that remembers what it was told. Clones share state.
///
/// Keeps both a segment view (`text`, the last thing written) and a 16x2
/// character grid that honours `set_cursor`.
#[derive(Debug, Clone, Default)]
pub struct MemoryDisplay {
    state: Arc<Mutex<State>>,
}

impl MemoryDisplay {
    /// Creates a blank display.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Last rendered text.
    #[must_use]
    pub fn text(&self) -> String {
        self.lock().text.clone()
    }

    /// One row of the character grid, trailing blanks trimmed.
    #[must_use]
    pub fn row(&self, row: usize) -> String {
        self.lock()
            .rows
            .get(row)
            .map(|cells| cells.iter().collect::<String>().trim_end().to_string())
            .unwrap_or_default()
    }

    /// Every call received so far.
    #[must_use]
    pub fn ops(&self) -> Vec<DisplayOp> {
        self.lock().ops.clone()
    }

    /// History of rendered texts.
    #[must_use]
    pub fn history(&self) -> Vec<String> {
        self.lock()
            .ops
            .iter()
            .filter_map(|op| match op {
                DisplayOp::Show(text) => Some(text.clone()),
                DisplayOp::Number(value) => Some(format_number(*value)),
                DisplayOp::Numbers(l, r, c) => Some(format_numbers(*l, *r, *c)),
                DisplayOp::Cursor(..) => None,
            })
            .collect()
    }
}

impl DisplaySink for MemoryDisplay {
    fn show(&mut self, text: &str) {
        let mut state = self.lock();
        state.ops.push(DisplayOp::Show(text.to_string()));
        state.write(text.to_string());
    }

    fn number(&mut self, value: i32) {
        let mut state = self.lock();
        state.ops.push(DisplayOp::Number(value));
        state.write(format_number(value));
    }

    fn numbers(&mut self, left: u8, right: u8, colon: bool) {
        let mut state = self.lock();
        state.ops.push(DisplayOp::Numbers(left, right, colon));
        state.write(format_numbers(left, right, colon));
    }

    fn set_cursor(&mut self, col: u8, row: u8) {
        let mut state = self.lock();
        state.ops.push(DisplayOp::Cursor(col, row));
        state.cursor = (usize::from(col), usize::from(row));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segment_text_tracks_last_write() {
        let display = MemoryDisplay::new();
        let mut sink = display.clone();
        sink.show("Strt");
        sink.numbers(0, 30, true);
        assert_eq!(display.text(), "00:30");
        assert_eq!(display.history(), vec!["Strt", "00:30"]);
    }

    #[test]
    fn test_character_grid_honours_cursor() {
        let display = MemoryDisplay::new();
        let mut sink = display.clone();
        sink.set_cursor(0, 0);
        sink.show("Time ");
        sink.numbers(0, 12, true);
        sink.set_cursor(0, 1);
        sink.show("Score");
        sink.set_cursor(6, 1);
        sink.number(3);
        assert_eq!(display.row(0), "Time 00:12");
        assert_eq!(display.row(1), "Score    3");
    }

    #[test]
    fn test_writes_past_edge_are_clipped() {
        let display = MemoryDisplay::new();
        let mut sink = display.clone();
        sink.set_cursor(14, 0);
        sink.show("abcd");
        assert_eq!(display.row(0), format!("{}ab", " ".repeat(14)));
    }
}
