//! Deadline timer
//!
//! A countdown that is checked, not scheduled. `poll()` looks at the clock,
//! and when the deadline has passed it runs the expiry callback once and then
//! applies the one-shot or repeat policy.

use std::fmt;
use std::time::Duration;

use crate::error::TimerError;

use super::clock::{SharedClock, Ticks, ticks_diff};

/// Longest duration measurable with wrapping `u32` millisecond ticks.
pub const MAX_DURATION_MS: u32 = u32::MAX / 2;

/// Expiry handler. Receives the timer that fired so it may restart or stop it.
pub type TimerCallback = Box<dyn FnMut(&mut DeadlineTimer) + Send>;

/// Poll-driven one-shot or repeating countdown.
///
/// A repeating timer re-bases on the instant it was polled, not on the
/// missed deadline, so a late poll produces exactly one callback and never
/// a burst of catch-up callbacks.
pub struct DeadlineTimer {
    name: String,
    clock: SharedClock,
    duration_ms: Option<u32>,
    started_at: Option<Ticks>,
    running: bool,
    one_shot: bool,
    callback: Option<TimerCallback>,
    /// Bumped by every `start()`/`stop()`; lets `poll()` see whether the
    /// callback took control of the timer.
    epoch: u64,
    fired: u64,
}

impl DeadlineTimer {
    /// Creates a stopped, unconfigured one-shot timer.
    #[must_use]
    pub fn new(name: impl Into<String>, clock: SharedClock) -> Self {
        Self {
            name: name.into(),
            clock,
            duration_ms: None,
            started_at: None,
            running: false,
            one_shot: true,
            callback: None,
            epoch: 0,
            fired: 0,
        }
    }

    /// Creates a timer and configures it in one step.
    ///
    /// # Errors
    ///
    /// Returns [`TimerError`] if `duration` is zero or too long.
    pub fn with_duration(
        name: impl Into<String>,
        clock: SharedClock,
        duration: Duration,
        one_shot: bool,
    ) -> Result<Self, TimerError> {
        let mut timer = Self::new(name, clock);
        timer.configure(duration, one_shot)?;
        Ok(timer)
    }

    /// Sets the duration and one-shot flag.
    ///
    /// Does not start or stop the timer.
    ///
    /// # Errors
    ///
    /// Returns [`TimerError::NonPositiveDuration`] for a zero duration and
    /// [`TimerError::DurationOutOfRange`] when the duration cannot be measured
    /// with wrapping ticks.
    pub fn configure(&mut self, duration: Duration, one_shot: bool) -> Result<(), TimerError> {
        let millis = i64::try_from(duration.as_millis()).unwrap_or(i64::MAX);
        self.configure_millis(millis, one_shot)
    }

    /// Signed variant of [`configure`](Self::configure) for values coming
    /// straight from user input.
    ///
    /// # Errors
    ///
    /// Returns [`TimerError::NonPositiveDuration`] for `millis <= 0` and
    /// [`TimerError::DurationOutOfRange`] above [`MAX_DURATION_MS`].
    pub fn configure_millis(&mut self, millis: i64, one_shot: bool) -> Result<(), TimerError> {
        if millis <= 0 {
            return Err(TimerError::NonPositiveDuration {
                timer: self.name.clone(),
                millis,
            });
        }
        let Ok(ms) = u32::try_from(millis) else {
            return Err(self.out_of_range(millis));
        };
        if ms > MAX_DURATION_MS {
            return Err(self.out_of_range(millis));
        }
        self.duration_ms = Some(ms);
        self.one_shot = one_shot;
        Ok(())
    }

    fn out_of_range(&self, millis: i64) -> TimerError {
        TimerError::DurationOutOfRange {
            timer: self.name.clone(),
            millis,
            limit: MAX_DURATION_MS,
        }
    }

    /// Installs the expiry callback, replacing any previous one.
    pub fn set_callback<F>(&mut self, callback: F)
    where
        F: FnMut(&mut Self) + Send + 'static,
    {
        self.callback = Some(Box::new(callback));
    }

    /// Checks that the timer can be armed: it has a duration and a callback.
    ///
    /// # Errors
    ///
    /// Returns [`TimerError::MissingCallback`] when no callback is installed,
    /// or [`TimerError::NonPositiveDuration`] when never configured.
    pub fn ensure_armable(&self) -> Result<(), TimerError> {
        if self.duration_ms.is_none() {
            return Err(TimerError::NonPositiveDuration {
                timer: self.name.clone(),
                millis: 0,
            });
        }
        if self.callback.is_none() {
            return Err(TimerError::MissingCallback {
                timer: self.name.clone(),
            });
        }
        Ok(())
    }

    /// Records the reference instant and marks the timer running.
    ///
    /// Restarting a running timer re-bases it.
    pub fn start(&mut self) {
        self.started_at = Some(self.clock.now_ms());
        self.running = true;
        self.epoch = self.epoch.wrapping_add(1);
    }

    /// Stops the timer without firing. Idempotent.
    pub fn stop(&mut self) {
        self.running = false;
        self.started_at = None;
        self.epoch = self.epoch.wrapping_add(1);
    }

    /// Time since the reference instant; zero when not running.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        Duration::from_millis(u64::from(self.elapsed_ms()))
    }

    fn elapsed_ms(&self) -> u32 {
        match self.started_at {
            Some(start) if self.running => ticks_diff(self.clock.now_ms(), start),
            _ => 0,
        }
    }

    /// Time left before expiry, if the timer is running and configured.
    #[must_use]
    pub fn remaining(&self) -> Option<Duration> {
        if !self.running {
            return None;
        }
        let duration = self.duration_ms?;
        Some(Duration::from_millis(u64::from(
            duration.saturating_sub(self.elapsed_ms()),
        )))
    }

    /// `running ∧ duration set ∧ elapsed ≥ duration`.
    #[must_use]
    pub fn has_ended(&self) -> bool {
        match self.duration_ms {
            Some(duration) if self.running => self.elapsed_ms() >= duration,
            _ => false,
        }
    }

    /// Fires the callback if the deadline has passed.
    ///
    /// Returns `true` when the callback ran. After the callback returns,
    /// a one-shot timer is stopped and a repeating timer is re-based to the
    /// current instant, unless the callback itself called `start()` or
    /// `stop()`, in which case its decision stands.
    pub fn poll(&mut self) -> bool {
        if !self.has_ended() {
            return false;
        }

        let epoch = self.epoch;
        if let Some(mut callback) = self.callback.take() {
            callback(self);
            // A callback that installed a replacement keeps the replacement.
            if self.callback.is_none() {
                self.callback = Some(callback);
            }
        }
        self.fired = self.fired.wrapping_add(1);

        if self.epoch == epoch {
            if self.one_shot {
                self.stop();
            } else {
                self.started_at = Some(self.clock.now_ms());
            }
        }
        true
    }

    /// Timer name, used in logs and errors.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the timer is counting.
    #[must_use]
    pub const fn is_running(&self) -> bool {
        self.running
    }

    /// Whether the timer stops itself after firing.
    #[must_use]
    pub const fn is_one_shot(&self) -> bool {
        self.one_shot
    }

    /// Configured duration, if any.
    #[must_use]
    pub fn duration(&self) -> Option<Duration> {
        self.duration_ms
            .map(|ms| Duration::from_millis(u64::from(ms)))
    }

    /// Number of times the callback has fired since construction.
    #[must_use]
    pub const fn fire_count(&self) -> u64 {
        self.fired
    }
}

impl fmt::Debug for DeadlineTimer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeadlineTimer")
            .field("name", &self.name)
            .field("duration_ms", &self.duration_ms)
            .field("running", &self.running)
            .field("one_shot", &self.one_shot)
            .field("fired", &self.fired)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timer::ManualClock;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn counting_timer(clock: &Arc<ManualClock>, ms: u64, one_shot: bool) -> (DeadlineTimer, Arc<AtomicU32>) {
        let hits = Arc::new(AtomicU32::new(0));
        let mut timer =
            DeadlineTimer::with_duration("t", clock.clone(), Duration::from_millis(ms), one_shot)
                .unwrap();
        let h = Arc::clone(&hits);
        timer.set_callback(move |_| {
            h.fetch_add(1, Ordering::SeqCst);
        });
        (timer, hits)
    }

    #[test]
    fn test_elapsed_zero_before_start() {
        let clock = ManualClock::shared(1000);
        let (timer, _) = counting_timer(&clock, 50, true);
        clock.advance(500);
        assert_eq!(timer.elapsed(), Duration::ZERO);
        assert!(!timer.has_ended());
    }

    #[test]
    fn test_one_shot_fires_exactly_at_deadline() {
        let clock = ManualClock::shared(0);
        let (mut timer, hits) = counting_timer(&clock, 100, true);
        timer.start();

        for _ in 0..99 {
            clock.advance(1);
            assert!(!timer.has_ended());
            assert!(!timer.poll());
        }
        clock.advance(1);
        assert!(timer.has_ended());
        assert!(timer.poll());
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert!(!timer.is_running());

        clock.advance(1000);
        assert!(!timer.poll());
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_repeating_fires_once_per_period() {
        let clock = ManualClock::shared(0);
        let (mut timer, hits) = counting_timer(&clock, 100, false);
        timer.start();

        // cadence 10 ms over one second
        for _ in 0..100 {
            clock.advance(10);
            timer.poll();
        }
        assert_eq!(hits.load(Ordering::SeqCst), 10);
        assert!(timer.is_running());
    }

    #[test]
    fn test_repeating_late_poll_fires_once() {
        let clock = ManualClock::shared(0);
        let (mut timer, hits) = counting_timer(&clock, 100, false);
        timer.start();

        clock.advance(1050);
        assert!(timer.poll());
        assert!(!timer.poll());
        assert_eq!(hits.load(Ordering::SeqCst), 1);

        // re-based on the late poll, not on the missed deadline
        clock.advance(99);
        assert!(!timer.poll());
        clock.advance(1);
        assert!(timer.poll());
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_stop_prevents_fire_and_is_idempotent() {
        let clock = ManualClock::shared(0);
        let (mut timer, hits) = counting_timer(&clock, 10, true);
        timer.start();
        timer.stop();
        timer.stop();
        clock.advance(100);
        assert!(!timer.poll());
        assert_eq!(hits.load(Ordering::SeqCst), 0);
        assert_eq!(timer.elapsed(), Duration::ZERO);
    }

    #[test]
    fn test_callback_restart_keeps_one_shot_running() {
        let clock = ManualClock::shared(0);
        let mut timer =
            DeadlineTimer::with_duration("chain", clock.clone(), Duration::from_millis(50), true)
                .unwrap();
        timer.set_callback(DeadlineTimer::start);
        timer.start();

        clock.advance(50);
        assert!(timer.poll());
        assert!(timer.is_running(), "restart from callback must survive");
        assert_eq!(timer.elapsed(), Duration::ZERO);

        clock.advance(50);
        assert!(timer.poll());
        assert_eq!(timer.fire_count(), 2);
    }

    #[test]
    fn test_callback_stop_keeps_repeating_stopped() {
        let clock = ManualClock::shared(0);
        let mut timer =
            DeadlineTimer::with_duration("once", clock.clone(), Duration::from_millis(20), false)
                .unwrap();
        timer.set_callback(DeadlineTimer::stop);
        timer.start();

        clock.advance(20);
        assert!(timer.poll());
        assert!(!timer.is_running(), "stop from callback must not be undone");
        clock.advance(100);
        assert!(!timer.poll());
    }

    #[test]
    fn test_callback_can_reconfigure_and_restart() {
        let clock = ManualClock::shared(0);
        let mut timer =
            DeadlineTimer::with_duration("frames", clock.clone(), Duration::from_millis(10), true)
                .unwrap();
        timer.set_callback(|t| {
            t.configure(Duration::from_millis(30), true).unwrap();
            t.start();
        });
        timer.start();
        clock.advance(10);
        assert!(timer.poll());
        assert_eq!(timer.duration(), Some(Duration::from_millis(30)));
        clock.advance(29);
        assert!(!timer.poll());
        clock.advance(1);
        assert!(timer.poll());
    }

    #[test]
    fn test_elapsed_survives_tick_wraparound() {
        let clock = ManualClock::shared(u32::MAX - 10);
        let (mut timer, hits) = counting_timer(&clock, 20, true);
        timer.start();
        clock.advance(19);
        assert_eq!(timer.elapsed(), Duration::from_millis(19));
        assert!(!timer.poll());
        clock.advance(1);
        assert!(timer.poll());
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_remaining_counts_down() {
        let clock = ManualClock::shared(0);
        let (mut timer, _) = counting_timer(&clock, 1000, true);
        assert_eq!(timer.remaining(), None);
        timer.start();
        clock.advance(250);
        assert_eq!(timer.remaining(), Some(Duration::from_millis(750)));
    }

    #[test]
    fn test_configure_rejects_non_positive() {
        let clock = ManualClock::shared(0);
        let mut timer = DeadlineTimer::new("bad", clock);
        assert!(matches!(
            timer.configure_millis(-5, true),
            Err(TimerError::NonPositiveDuration { millis: -5, .. })
        ));
        assert!(timer.configure(Duration::ZERO, true).is_err());
        assert_eq!(timer.duration(), None);
    }

    #[test]
    fn test_configure_rejects_out_of_range() {
        let clock = ManualClock::shared(0);
        let mut timer = DeadlineTimer::new("long", clock);
        let err = timer
            .configure(Duration::from_secs(60 * 60 * 24 * 30), true)
            .unwrap_err();
        assert!(matches!(err, TimerError::DurationOutOfRange { .. }));
    }

    #[test]
    fn test_ensure_armable_requires_callback() {
        let clock = ManualClock::shared(0);
        let mut timer =
            DeadlineTimer::with_duration("x", clock, Duration::from_millis(5), true).unwrap();
        assert!(matches!(
            timer.ensure_armable(),
            Err(TimerError::MissingCallback { .. })
        ));
        timer.set_callback(|_| {});
        assert!(timer.ensure_armable().is_ok());
    }

    #[test]
    fn test_unconfigured_timer_never_ends() {
        let clock = ManualClock::shared(0);
        let mut timer = DeadlineTimer::new("idle", clock.clone());
        timer.start();
        clock.advance(u32::MAX / 4);
        assert!(!timer.has_ended());
        assert!(!timer.poll());
    }
}
