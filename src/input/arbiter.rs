//! Input arbiter
//!
//! One `sample()` per loop iteration turns raw levels into at most one start,
//! one reset and one catch event. Sensor reads are skipped entirely unless a
//! target is active.

use std::collections::VecDeque;

use tracing::{debug, warn};

use crate::engine::TargetId;
use crate::peripherals::{Peripherals, SensorInput};

use super::channel::ButtonChannel;
use super::debug::DebugCommand;

/// What the arbiter observed this iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    /// Start button pressed (or `s` typed)
    Start,
    /// Reset button pressed (or `r` typed)
    Reset,
    /// A sensor fired; for hardware sensors this is always the active target
    Catch(TargetId),
}

/// Latch that lets a sustained "near" signal count only once.
///
/// Engages on the first near sample after an away sample and releases only
/// on an away sample (or when the arbiter moves to a new target).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TriggerLock {
    engaged: bool,
}

impl TriggerLock {
    /// Feeds one sample; returns `true` if it is a fresh trigger.
    pub const fn observe(&mut self, near: bool) -> bool {
        if near {
            let fresh = !self.engaged;
            self.engaged = true;
            fresh
        } else {
            self.engaged = false;
            false
        }
    }

    /// Releases the latch.
    pub const fn clear(&mut self) {
        self.engaged = false;
    }

    /// Whether the latch is engaged.
    #[must_use]
    pub const fn is_engaged(&self) -> bool {
        self.engaged
    }
}

struct SensorSlot {
    sensor: SensorInput,
    faulted: bool,
}

/// Merges buttons, the active target's sensor and debug input.
pub struct InputArbiter {
    start: Option<ButtonChannel>,
    reset: Option<ButtonChannel>,
    sensors: Vec<Option<SensorSlot>>,
    lock: TriggerLock,
    armed_for: Option<TargetId>,
    debug: VecDeque<DebugCommand>,
}

impl InputArbiter {
    /// Creates an arbiter over whichever channels exist.
    #[must_use]
    pub fn new(
        start: Option<ButtonChannel>,
        reset: Option<ButtonChannel>,
        sensors: Vec<Option<SensorInput>>,
    ) -> Self {
        Self {
            start,
            reset,
            sensors: sensors
                .into_iter()
                .map(|s| {
                    s.map(|sensor| SensorSlot {
                        sensor,
                        faulted: false,
                    })
                })
                .collect(),
            lock: TriggerLock::default(),
            armed_for: None,
            debug: VecDeque::new(),
        }
    }

    /// Takes the input handles out of a negotiated peripheral set.
    pub fn from_peripherals(peripherals: &mut Peripherals) -> Self {
        let start = peripherals
            .start_button
            .take()
            .map(|(pin, polarity)| ButtonChannel::new("start", pin, polarity));
        let reset = peripherals
            .reset_button
            .take()
            .map(|(pin, polarity)| ButtonChannel::new("reset", pin, polarity));
        let sensors = std::mem::take(&mut peripherals.sensors);
        Self::new(start, reset, sensors)
    }

    /// Queues a debug command for the next `sample()`.
    pub fn push_debug(&mut self, command: DebugCommand) {
        self.debug.push_back(command);
    }

    /// Samples every channel once.
    ///
    /// `active` is the engine's current target; `None` means not playing,
    /// in which case no sensor is read and the trigger lock is released.
    pub fn sample(&mut self, active: Option<TargetId>) -> Vec<InputEvent> {
        let mut events = Vec::new();

        if self.start.as_mut().is_some_and(ButtonChannel::pressed) {
            events.push(InputEvent::Start);
        }
        if self.reset.as_mut().is_some_and(ButtonChannel::pressed) {
            events.push(InputEvent::Reset);
        }

        if active != self.armed_for {
            self.lock.clear();
            self.armed_for = active;
        }
        if let Some(target) = active
            && self.sample_sensor(target)
        {
            debug!(target = %target, "sensor triggered");
            events.push(InputEvent::Catch(target));
        }

        while let Some(command) = self.debug.pop_front() {
            events.push(match command {
                DebugCommand::Start => InputEvent::Start,
                DebugCommand::Reset => InputEvent::Reset,
                DebugCommand::Catch(target) => InputEvent::Catch(target),
            });
        }

        events
    }

    fn sample_sensor(&mut self, target: TargetId) -> bool {
        let Some(slot) = self.sensors.get_mut(target.index()).and_then(Option::as_mut) else {
            return false;
        };
        match slot.sensor.is_near() {
            Ok(near) => {
                slot.faulted = false;
                self.lock.observe(near)
            }
            Err(error) => {
                if !slot.faulted {
                    warn!(target = %target, %error, "sensor read failed");
                    slot.faulted = true;
                }
                false
            }
        }
    }

    /// Whether the trigger lock is currently engaged.
    #[must_use]
    pub const fn lock_engaged(&self) -> bool {
        self.lock.is_engaged()
    }
}

impl std::fmt::Debug for InputArbiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InputArbiter")
            .field("start", &self.start.is_some())
            .field("reset", &self.reset.is_some())
            .field("sensors", &self.sensors.iter().filter(|s| s.is_some()).count())
            .field("lock", &self.lock)
            .field("armed_for", &self.armed_for)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::Polarity;
    use crate::peripherals::{Board, VirtualBoard, VirtualLevel};

    struct Rig {
        arbiter: InputArbiter,
        start: VirtualLevel,
        reset: VirtualLevel,
        sensors: Vec<VirtualLevel>,
    }

    fn rig() -> Rig {
        let pins = ["A0", "A1", "S1", "S2", "S3"];
        let mut board = VirtualBoard::new(pins);
        let start = board.level("A0").unwrap();
        let reset = board.level("A1").unwrap();
        let sensors: Vec<_> = pins[2..].iter().map(|p| board.level(p).unwrap()).collect();
        let arbiter = InputArbiter::new(
            Some(ButtonChannel::new(
                "start",
                board.digital_input("A0", Polarity::ActiveLow).unwrap(),
                Polarity::ActiveLow,
            )),
            Some(ButtonChannel::new(
                "reset",
                board.digital_input("A1", Polarity::ActiveLow).unwrap(),
                Polarity::ActiveLow,
            )),
            pins[2..]
                .iter()
                .map(|p| {
                    Some(SensorInput::Digital {
                        pin: board.digital_input(p, Polarity::ActiveLow).unwrap(),
                        polarity: Polarity::ActiveLow,
                    })
                })
                .collect(),
        );
        Rig {
            arbiter,
            start,
            reset,
            sensors,
        }
    }

    #[test]
    fn test_trigger_lock_transitions() {
        let mut lock = TriggerLock::default();
        assert!(lock.observe(true));
        assert!(!lock.observe(true));
        assert!(lock.is_engaged());
        assert!(!lock.observe(false));
        assert!(!lock.is_engaged());
        assert!(lock.observe(true));
    }

    #[test]
    fn test_buttons_report_edges() {
        let mut rig = rig();
        rig.start.set(false);
        assert_eq!(rig.arbiter.sample(None), vec![InputEvent::Start]);
        assert!(rig.arbiter.sample(None).is_empty());
        rig.reset.set(false);
        assert_eq!(rig.arbiter.sample(None), vec![InputEvent::Reset]);
    }

    #[test]
    fn test_sustained_sensor_catches_once() {
        let mut rig = rig();
        let target = TargetId::new(1);
        rig.sensors[1].set(false);
        assert_eq!(rig.arbiter.sample(Some(target)), vec![InputEvent::Catch(target)]);
        for _ in 0..10 {
            assert!(rig.arbiter.sample(Some(target)).is_empty());
        }
        rig.sensors[1].set(true);
        assert!(rig.arbiter.sample(Some(target)).is_empty());
        rig.sensors[1].set(false);
        assert_eq!(rig.arbiter.sample(Some(target)), vec![InputEvent::Catch(target)]);
    }

    #[test]
    fn test_only_active_sensor_is_read() {
        let mut rig = rig();
        rig.sensors[0].set(false);
        rig.sensors[2].set(false);
        assert!(rig.arbiter.sample(Some(TargetId::new(1))).is_empty());
    }

    #[test]
    fn test_no_sensor_read_when_idle() {
        let mut rig = rig();
        rig.sensors[0].set(false);
        assert!(rig.arbiter.sample(None).is_empty());
        assert!(!rig.arbiter.lock_engaged());
    }

    #[test]
    fn test_new_target_releases_lock() {
        let mut rig = rig();
        rig.sensors[0].set(false);
        rig.sensors[1].set(false);
        let first = TargetId::new(0);
        let second = TargetId::new(1);
        assert_eq!(rig.arbiter.sample(Some(first)), vec![InputEvent::Catch(first)]);
        assert!(rig.arbiter.lock_engaged());
        assert_eq!(rig.arbiter.sample(Some(second)), vec![InputEvent::Catch(second)]);
    }

    #[test]
    fn test_missing_sensor_never_catches() {
        let mut arbiter = InputArbiter::new(None, None, vec![None, None]);
        assert!(arbiter.sample(Some(TargetId::new(0))).is_empty());
    }

    #[test]
    fn test_debug_commands_drain_in_order() {
        let mut arbiter = InputArbiter::new(None, None, vec![None, None]);
        arbiter.push_debug(DebugCommand::Start);
        arbiter.push_debug(DebugCommand::Catch(TargetId::new(1)));
        assert_eq!(
            arbiter.sample(None),
            vec![InputEvent::Start, InputEvent::Catch(TargetId::new(1))]
        );
        assert!(arbiter.sample(None).is_empty());
    }
}
