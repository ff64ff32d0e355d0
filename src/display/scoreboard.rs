//! Scoreboard
//!
//! A [`Panel`] is what both displays should show right now. The scoreboard
//! pushes a panel to whichever displays were negotiated, skipping the write
//! when nothing changed since the previous frame.

use std::time::Duration;

use super::{DisplaySink, SEGMENT_WIDTH};

const LCD_WIDTH: usize = 16;

/// Content of one display region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PanelText {
    /// Literal text (`Strt`, `End `, ` Go `)
    Text(String),
    /// Right-aligned integer
    Number(i32),
    /// `mm:ss`
    Clock {
        /// Minutes
        minutes: u8,
        /// Seconds
        seconds: u8,
    },
    /// Nothing lit
    Blank,
}

impl PanelText {
    /// Literal text.
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    /// Whole seconds left, rounded down, as `mm:ss`.
    #[must_use]
    pub fn clock(remaining: Duration) -> Self {
        let secs = remaining.as_secs();
        Self::Clock {
            minutes: u8::try_from(secs / 60).unwrap_or(u8::MAX),
            seconds: u8::try_from(secs % 60).unwrap_or(0),
        }
    }

    fn draw(&self, sink: &mut dyn DisplaySink) {
        match self {
            Self::Text(text) => sink.show(text),
            Self::Number(value) => sink.number(*value),
            Self::Clock { minutes, seconds } => sink.numbers(*minutes, *seconds, true),
            Self::Blank => sink.show(&" ".repeat(SEGMENT_WIDTH)),
        }
    }
}

/// What the time and score regions show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Panel {
    /// Time region (left display / LCD row 0)
    pub time: PanelText,
    /// Score region (right display / LCD row 1)
    pub score: PanelText,
}

impl Panel {
    /// Idle: `00:00` and `Strt`.
    #[must_use]
    pub fn idle() -> Self {
        Self {
            time: PanelText::Clock {
                minutes: 0,
                seconds: 0,
            },
            score: PanelText::text("Strt"),
        }
    }

    /// Playing: time left and current score.
    #[must_use]
    pub fn playing(remaining: Duration, score: u32) -> Self {
        Self {
            time: PanelText::clock(remaining),
            score: PanelText::Number(score_value(score)),
        }
    }

    /// Game over: `End ` and the final score.
    #[must_use]
    pub fn game_over(score: u32) -> Self {
        Self {
            time: PanelText::text("End "),
            score: PanelText::Number(score_value(score)),
        }
    }

    /// Both regions dark.
    #[must_use]
    pub const fn blank() -> Self {
        Self {
            time: PanelText::Blank,
            score: PanelText::Blank,
        }
    }
}

fn draw_row(sink: &mut dyn DisplaySink, row: u8, label: &str, text: &PanelText) {
    sink.set_cursor(0, row);
    sink.show(&" ".repeat(LCD_WIDTH));
    sink.set_cursor(0, row);
    sink.show(label);
    text.draw(sink);
}

fn score_value(score: u32) -> i32 {
    i32::try_from(score).unwrap_or(i32::MAX)
}

/// Display handles in one of the two supported layouts.
pub enum DisplayHandles {
    /// Two four-digit segment displays
    Segment {
        /// Time display
        time: Option<Box<dyn DisplaySink>>,
        /// Score display
        score: Option<Box<dyn DisplaySink>>,
    },
    /// One 16x2 character LCD
    Character {
        /// The LCD
        lcd: Option<Box<dyn DisplaySink>>,
    },
}

impl DisplayHandles {
    /// Whether at least one display is attached.
    #[must_use]
    pub const fn any(&self) -> bool {
        match self {
            Self::Segment { time, score } => time.is_some() || score.is_some(),
            Self::Character { lcd } => lcd.is_some(),
        }
    }
}

/// Renders panels onto the negotiated displays.
pub struct Scoreboard {
    handles: DisplayHandles,
    last: Option<Panel>,
}

impl Scoreboard {
    /// Wraps the display handles.
    #[must_use]
    pub const fn new(handles: DisplayHandles) -> Self {
        Self {
            handles,
            last: None,
        }
    }

    /// Draws `panel` unless it is already up. Returns whether anything was
    /// written.
    pub fn render(&mut self, panel: &Panel) -> bool {
        if self.last.as_ref() == Some(panel) {
            return false;
        }
        let previous = self.last.replace(panel.clone());
        match &mut self.handles {
            DisplayHandles::Segment { time, score } => {
                let time_changed = previous.as_ref().is_none_or(|p| p.time != panel.time);
                let score_changed = previous.as_ref().is_none_or(|p| p.score != panel.score);
                if let Some(sink) = time.as_deref_mut()
                    && time_changed
                {
                    panel.time.draw(sink);
                }
                if let Some(sink) = score.as_deref_mut()
                    && score_changed
                {
                    panel.score.draw(sink);
                }
            }
            DisplayHandles::Character { lcd } => {
                if let Some(sink) = lcd.as_deref_mut() {
                    draw_row(sink, 0, "Time  ", &panel.time);
                    draw_row(sink, 1, "Score ", &panel.score);
                }
            }
        }
        true
    }

    /// The panel currently shown.
    #[must_use]
    pub const fn current(&self) -> Option<&Panel> {
        self.last.as_ref()
    }
}

impl std::fmt::Debug for Scoreboard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scoreboard")
            .field("attached", &self.handles.any())
            .field("last", &self.last)
            .finish()
    }
}
