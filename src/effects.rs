//! Start countdown and end-of-round flash
//!
//! Animations are frame lists played back by a one-shot [`DeadlineTimer`]
//! that is re-armed with each frame's hold time, so the control loop keeps
//! sampling inputs while they run. They only touch the displays and the
//! indicators; engine state, score and timers are never changed here.

use std::collections::VecDeque;
use std::time::Duration;

use tracing::{debug, warn};

use crate::actuator::{ActuatorBroadcaster, ActuatorCommand};
use crate::display::{Panel, PanelText, Scoreboard};
use crate::timer::{DeadlineTimer, SharedClock};

/// Which animation is playing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimationKind {
    /// Before a round; the round starts when it finishes
    Countdown,
    /// After game over
    EndFlash,
}

/// One step of an animation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// What the displays show; `None` leaves them alone
    pub panel: Option<Panel>,
    /// Indicator command sent when the frame appears
    pub actuator: Option<ActuatorCommand>,
    /// How long the frame stays up
    pub hold: Duration,
}

impl Frame {
    fn new(panel: Panel, actuator: ActuatorCommand, hold_ms: u64) -> Self {
        Self {
            panel: Some(panel),
            actuator: Some(actuator),
            hold: Duration::from_millis(hold_ms),
        }
    }

    fn apply(&self, scoreboard: &mut Scoreboard, broadcaster: &mut ActuatorBroadcaster) {
        if let Some(panel) = &self.panel {
            scoreboard.render(panel);
        }
        if let Some(command) = self.actuator {
            broadcaster.send(command);
        }
    }
}

/// A finite frame sequence with an optional closing frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Animation {
    kind: AnimationKind,
    frames: VecDeque<Frame>,
    finale: Option<Frame>,
}

impl Animation {
    /// `Strt` blinks twice, 3-2-1, ` Go `, then the indicators go dark.
    #[must_use]
    pub fn countdown() -> Self {
        let mut frames = VecDeque::new();
        for _ in 0..2 {
            frames.push_back(Frame::new(
                Panel {
                    time: PanelText::Clock {
                        minutes: 0,
                        seconds: 0,
                    },
                    score: PanelText::text("Strt"),
                },
                ActuatorCommand::All,
                300,
            ));
            frames.push_back(Frame::new(
                Panel {
                    time: PanelText::Clock {
                        minutes: 0,
                        seconds: 0,
                    },
                    score: PanelText::Blank,
                },
                ActuatorCommand::Off,
                300,
            ));
        }
        for count in (1..=3).rev() {
            frames.push_back(Frame::new(
                Panel {
                    time: PanelText::Number(count),
                    score: PanelText::Number(count),
                },
                ActuatorCommand::All,
                600,
            ));
            frames.push_back(Frame::new(Panel::blank(), ActuatorCommand::Off, 400));
        }
        frames.push_back(Frame::new(
            Panel {
                time: PanelText::text(" Go "),
                score: PanelText::text(" Go "),
            },
            ActuatorCommand::All,
            500,
        ));
        Self {
            kind: AnimationKind::Countdown,
            frames,
            finale: Some(Frame {
                panel: None,
                actuator: Some(ActuatorCommand::Off),
                hold: Duration::ZERO,
            }),
        }
    }

    /// Four `End ` / score flashes, finishing on `End ` and the score.
    #[must_use]
    pub fn end_flash(score: u32) -> Self {
        let mut frames = VecDeque::new();
        for _ in 0..4 {
            frames.push_back(Frame::new(
                Panel::game_over(score),
                ActuatorCommand::All,
                400,
            ));
            frames.push_back(Frame::new(Panel::blank(), ActuatorCommand::Off, 400));
        }
        Self {
            kind: AnimationKind::EndFlash,
            frames,
            finale: Some(Frame::new(Panel::game_over(score), ActuatorCommand::Off, 0)),
        }
    }

    /// Animation kind.
    #[must_use]
    pub const fn kind(&self) -> AnimationKind {
        self.kind
    }

    /// Total running time, closing frame excluded.
    #[must_use]
    pub fn duration(&self) -> Duration {
        self.frames.iter().map(|f| f.hold).sum()
    }
}

/// Plays one animation at a time.
#[derive(Debug)]
pub struct AnimationPlayer {
    timer: DeadlineTimer,
    current: Option<Animation>,
}

impl AnimationPlayer {
    /// Creates an idle player.
    #[must_use]
    pub fn new(clock: SharedClock) -> Self {
        let mut timer = DeadlineTimer::new("animation", clock);
        // Frames advance from `poll`'s return value.
        timer.set_callback(|_| {});
        Self {
            timer,
            current: None,
        }
    }

    /// Starts `animation`, replacing whatever was playing, and shows its
    /// first frame immediately.
    pub fn play(
        &mut self,
        animation: Animation,
        scoreboard: &mut Scoreboard,
        broadcaster: &mut ActuatorBroadcaster,
    ) {
        debug!(kind = ?animation.kind, "animation started");
        self.current = Some(animation);
        self.advance(scoreboard, broadcaster);
    }

    /// Advances the animation if the current frame's hold has elapsed.
    ///
    /// Returns the kind of an animation that finished during this call.
    pub fn poll(
        &mut self,
        scoreboard: &mut Scoreboard,
        broadcaster: &mut ActuatorBroadcaster,
    ) -> Option<AnimationKind> {
        if self.current.is_none() || !self.timer.poll() {
            return None;
        }
        self.advance(scoreboard, broadcaster)
    }

    /// Stops playback without showing the remaining frames.
    pub fn cancel(&mut self) {
        if let Some(animation) = self.current.take() {
            debug!(kind = ?animation.kind, "animation cancelled");
        }
        self.timer.stop();
    }

    /// Kind of the animation playing, if any.
    #[must_use]
    pub fn playing(&self) -> Option<AnimationKind> {
        self.current.as_ref().map(Animation::kind)
    }

    fn advance(
        &mut self,
        scoreboard: &mut Scoreboard,
        broadcaster: &mut ActuatorBroadcaster,
    ) -> Option<AnimationKind> {
        let animation = self.current.as_mut()?;
        if let Some(frame) = animation.frames.pop_front() {
            frame.apply(scoreboard, broadcaster);
            match self.timer.configure(frame.hold, true) {
                Ok(()) => self.timer.start(),
                Err(error) => {
                    warn!(%error, "animation frame skipped");
                    return self.advance(scoreboard, broadcaster);
                }
            }
            return None;
        }

        let kind = animation.kind;
        if let Some(finale) = animation.finale.take() {
            finale.apply(scoreboard, broadcaster);
        }
        self.current = None;
        self.timer.stop();
        debug!(?kind, "animation finished");
        Some(kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::{DisplayHandles, MemoryDisplay};
    use crate::timer::ManualClock;
    use crate::transport::MemoryLink;
    use std::sync::Arc;

    struct Rig {
        clock: Arc<ManualClock>,
        player: AnimationPlayer,
        scoreboard: Scoreboard,
        broadcaster: ActuatorBroadcaster,
        link: MemoryLink,
        time: MemoryDisplay,
        score: MemoryDisplay,
    }

    fn rig() -> Rig {
        let clock = ManualClock::shared(0);
        let link = MemoryLink::new();
        let time = MemoryDisplay::new();
        let score = MemoryDisplay::new();
        Rig {
            player: AnimationPlayer::new(clock.clone()),
            clock,
            scoreboard: Scoreboard::new(DisplayHandles::Segment {
                time: Some(Box::new(time.clone())),
                score: Some(Box::new(score.clone())),
            }),
            broadcaster: ActuatorBroadcaster::new(Some(Box::new(link.clone()))),
            link,
            time,
            score,
        }
    }

    fn run_to_end(rig: &mut Rig, step_ms: u32, limit_ms: u32) -> Option<(AnimationKind, u32)> {
        let mut t = 0;
        while t <= limit_ms {
            if let Some(kind) = rig.player.poll(&mut rig.scoreboard, &mut rig.broadcaster) {
                return Some((kind, t));
            }
            rig.clock.advance(step_ms);
            t += step_ms;
        }
        None
    }

    #[test]
    fn countdown_durations() {
        assert_eq!(Animation::countdown().duration(), Duration::from_millis(4700));
        assert_eq!(Animation::end_flash(3).duration(), Duration::from_millis(3200));
    }

    #[test]
    fn countdown_plays_to_completion() {
        let mut rig = rig();
        rig.player.play(
            Animation::countdown(),
            &mut rig.scoreboard,
            &mut rig.broadcaster,
        );
        assert_eq!(rig.score.text(), "Strt");
        assert_eq!(rig.player.playing(), Some(AnimationKind::Countdown));

        let (kind, at) = run_to_end(&mut rig, 10, 10_000).unwrap();
        assert_eq!(kind, AnimationKind::Countdown);
        assert_eq!(at, 4700);
        assert_eq!(rig.player.playing(), None);
        assert!(rig.time.history().contains(&" Go ".to_string()));
        assert!(rig.time.history().contains(&"   1".to_string()));

        let sent = rig.link.sent();
        assert_eq!(sent.first().map(String::as_str), Some("ALL"));
        assert_eq!(sent.last().map(String::as_str), Some("OFF"));
        assert_eq!(sent.iter().filter(|s| *s == "ALL").count(), 6);
    }

    #[test]
    fn end_flash_finishes_on_score() {
        let mut rig = rig();
        rig.player.play(
            Animation::end_flash(7),
            &mut rig.scoreboard,
            &mut rig.broadcaster,
        );
        let (kind, _) = run_to_end(&mut rig, 50, 10_000).unwrap();
        assert_eq!(kind, AnimationKind::EndFlash);
        assert_eq!(rig.time.text(), "End ");
        assert_eq!(rig.score.text(), "   7");
        assert_eq!(rig.link.last().as_deref(), Some("OFF"));
    }

    #[test]
    fn cancel_stops_playback() {
        let mut rig = rig();
        rig.player.play(
            Animation::countdown(),
            &mut rig.scoreboard,
            &mut rig.broadcaster,
        );
        rig.clock.advance(300);
        rig.player.poll(&mut rig.scoreboard, &mut rig.broadcaster);
        rig.player.cancel();
        let sent_before = rig.link.sent().len();

        assert!(run_to_end(&mut rig, 100, 10_000).is_none());
        assert_eq!(rig.link.sent().len(), sent_before);
    }
}
