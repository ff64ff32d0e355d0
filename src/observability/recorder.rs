//! Engine event fan-out to metrics and the JSONL stream.

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::engine::EngineEvent;

use super::events::{EventEmitter, GameEvent};
use super::metrics;

/// Turns [`EngineEvent`]s into metrics and [`GameEvent`]s.
///
/// Assigns a fresh `round_id` on every start; the id stays attached to the
/// events of that round until the next start or reset.
#[derive(Debug)]
pub struct GameRecorder {
    emitter: Option<Arc<EventEmitter>>,
    round_id: Option<Uuid>,
    targets: usize,
}

impl GameRecorder {
    /// Recorder writing events to `emitter`, if any.
    #[must_use]
    pub const fn new(emitter: Option<Arc<EventEmitter>>, targets: usize) -> Self {
        Self {
            emitter,
            round_id: None,
            targets,
        }
    }

    /// Current round id.
    #[must_use]
    pub const fn round_id(&self) -> Option<Uuid> {
        self.round_id
    }

    /// Records one engine event.
    pub fn record(&mut self, event: &EngineEvent) {
        let timestamp = Utc::now();
        let game_event = match *event {
            EngineEvent::Started => {
                let round_id = Uuid::new_v4();
                self.round_id = Some(round_id);
                metrics::record_round_started();
                Some(GameEvent::GameStarted {
                    timestamp,
                    round_id,
                    targets: self.targets,
                })
            }
            EngineEvent::TargetSpawned { target, previous } => {
                self.round_id.map(|round_id| GameEvent::TargetSpawned {
                    timestamp,
                    round_id,
                    target,
                    previous,
                })
            }
            EngineEvent::Caught { target, score } => {
                metrics::record_catch(score);
                self.round_id.map(|round_id| GameEvent::TargetCaught {
                    timestamp,
                    round_id,
                    target,
                    score,
                })
            }
            EngineEvent::Missed { attempted, active } => {
                metrics::record_miss();
                self.round_id.map(|round_id| GameEvent::CatchMissed {
                    timestamp,
                    round_id,
                    attempted,
                    active,
                })
            }
            EngineEvent::TimedOut { target } => {
                metrics::record_timeout();
                self.round_id.map(|round_id| GameEvent::TargetTimedOut {
                    timestamp,
                    round_id,
                    target,
                })
            }
            EngineEvent::GameOver { score, stats } => {
                self.round_id.map(|round_id| GameEvent::GameOver {
                    timestamp,
                    round_id,
                    score,
                    stats,
                })
            }
            EngineEvent::Reset => {
                metrics::record_reset();
                Some(GameEvent::GameReset {
                    timestamp,
                    round_id: self.round_id.take(),
                })
            }
        };

        if let (Some(emitter), Some(game_event)) = (&self.emitter, game_event) {
            emitter.emit(game_event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{RoundStats, TargetId};

    #[test]
    fn round_id_spans_start_to_reset() {
        let mut recorder = GameRecorder::new(None, 5);
        assert!(recorder.round_id().is_none());
        recorder.record(&EngineEvent::Started);
        let id = recorder.round_id();
        assert!(id.is_some());
        recorder.record(&EngineEvent::TargetSpawned {
            target: TargetId::new(0),
            previous: None,
        });
        recorder.record(&EngineEvent::GameOver {
            score: 0,
            stats: RoundStats::default(),
        });
        assert_eq!(recorder.round_id(), id);
        recorder.record(&EngineEvent::Reset);
        assert!(recorder.round_id().is_none());
    }

    #[test]
    fn new_round_gets_new_id() {
        let mut recorder = GameRecorder::new(Some(Arc::new(EventEmitter::noop())), 5);
        recorder.record(&EngineEvent::Started);
        let first = recorder.round_id();
        recorder.record(&EngineEvent::Started);
        assert_ne!(recorder.round_id(), first);
    }
}
