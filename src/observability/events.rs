//! Structured game event stream.
//!
//! Typed events serialized as newline-delimited JSON, each wrapped with a
//! monotonically increasing sequence number.

use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::engine::{RoundStats, TargetId};

// ---------------------------------------------------------------------------
// Event variants
// ---------------------------------------------------------------------------

/// A discrete event in the life of a round.
///
/// Tagged with `"type"` when serialized so consumers can dispatch on kind.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum GameEvent {
    /// A round started.
    GameStarted {
        /// When the round started.
        timestamp: DateTime<Utc>,
        /// Identifier shared by every event of the round.
        round_id: Uuid,
        /// Number of target positions.
        targets: usize,
    },

    /// A target became active.
    TargetSpawned {
        /// When the target appeared.
        timestamp: DateTime<Utc>,
        /// Round identifier.
        round_id: Uuid,
        /// One-based target number.
        target: TargetId,
        /// Target it replaced.
        previous: Option<TargetId>,
    },

    /// The active target was caught.
    TargetCaught {
        /// When the catch registered.
        timestamp: DateTime<Utc>,
        /// Round identifier.
        round_id: Uuid,
        /// One-based target number.
        target: TargetId,
        /// Score after the catch.
        score: u32,
    },

    /// A sensor other than the active one fired.
    CatchMissed {
        /// When the attempt registered.
        timestamp: DateTime<Utc>,
        /// Round identifier.
        round_id: Uuid,
        /// Target that fired.
        attempted: TargetId,
        /// Target that was active.
        active: TargetId,
    },

    /// The active target expired.
    TargetTimedOut {
        /// When the deadline passed.
        timestamp: DateTime<Utc>,
        /// Round identifier.
        round_id: Uuid,
        /// One-based target number.
        target: TargetId,
    },

    /// The round deadline passed.
    GameOver {
        /// When the round ended.
        timestamp: DateTime<Utc>,
        /// Round identifier.
        round_id: Uuid,
        /// Final score.
        score: u32,
        /// Round counters.
        stats: RoundStats,
    },

    /// The game returned to idle.
    GameReset {
        /// When the reset happened.
        timestamp: DateTime<Utc>,
        /// Round that was abandoned, if one was running or finished.
        round_id: Option<Uuid>,
    },
}

// ---------------------------------------------------------------------------
// Envelope (adds sequence number via serde flatten)
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct EventEnvelope {
    sequence: u64,
    #[serde(flatten)]
    event: GameEvent,
}

// ---------------------------------------------------------------------------
// Emitter
// ---------------------------------------------------------------------------

/// Thread-safe, buffered JSONL event writer.
///
/// Serialization or I/O failures are dropped: a full disk must not stop a
/// round in progress.
pub struct EventEmitter {
    writer: Mutex<BufWriter<Box<dyn Write + Send>>>,
    sequence: AtomicU64,
}

impl std::fmt::Debug for EventEmitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventEmitter")
            .field("sequence", &self.sequence.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

impl EventEmitter {
    /// Creates an emitter that writes to the given writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write + Send>) -> Self {
        Self {
            writer: Mutex::new(BufWriter::new(writer)),
            sequence: AtomicU64::new(0),
        }
    }

    /// Creates an emitter that silently discards all events.
    #[must_use]
    pub fn noop() -> Self {
        Self::new(Box::new(std::io::sink()))
    }

    /// Creates an emitter that writes to a file at `path`.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file cannot be created.
    pub fn from_file(path: &Path) -> std::io::Result<Self> {
        let file = std::fs::File::create(path)?;
        Ok(Self::new(Box::new(file)))
    }

    /// Emits an event as a single JSONL line.
    pub fn emit(&self, event: GameEvent) {
        let sequence = self.sequence.fetch_add(1, Ordering::SeqCst);
        let envelope = EventEnvelope { sequence, event };

        if let Ok(mut w) = self.writer.lock()
            && let Ok(line) = serde_json::to_string(&envelope)
        {
            let _ = writeln!(w, "{line}");
            let _ = w.flush();
        }
    }

    /// Number of events emitted so far.
    #[must_use]
    pub fn event_count(&self) -> u64 {
        self.sequence.load(Ordering::Relaxed)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
