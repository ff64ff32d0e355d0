//! Prometheus metrics.
//!
//! Counters are recorded through the `metrics` facade; without an
//! installed recorder they are no-ops, so library users and tests pay
//! nothing.

use std::sync::atomic::{AtomicBool, Ordering};

use metrics::{counter, describe_counter, describe_gauge, gauge};
use metrics_exporter_prometheus::PrometheusBuilder;

use crate::error::GameError;

/// Guard to prevent double-initialization of the metrics recorder.
static METRICS_INITIALIZED: AtomicBool = AtomicBool::new(false);

/// Installs the global recorder.
///
/// With `port`, a Prometheus HTTP listener is started on
/// `127.0.0.1:<port>`; without, metrics are recorded but not exported.
///
/// # Errors
///
/// Returns [`GameError::Io`] if the recorder or listener cannot be
/// installed (e.g. port already in use).
pub fn init_metrics(port: Option<u16>) -> Result<(), GameError> {
    if METRICS_INITIALIZED.swap(true, Ordering::SeqCst) {
        tracing::debug!("metrics already initialized, skipping");
        return Ok(());
    }
    port.map_or_else(
        || PrometheusBuilder::new().install_recorder().map(|_| ()),
        |p| {
            PrometheusBuilder::new()
                .with_http_listener(([127, 0, 0, 1], p))
                .install()
        },
    )
    .map_err(|e| GameError::Io(std::io::Error::other(e.to_string())))?;

    describe_metrics();
    Ok(())
}

fn describe_metrics() {
    describe_counter!("fishing_game_rounds_total", "Rounds started");
    describe_counter!("fishing_game_catches_total", "Targets caught");
    describe_counter!(
        "fishing_game_misses_total",
        "Catch attempts on a target that was not active"
    );
    describe_counter!("fishing_game_timeouts_total", "Targets that expired");
    describe_counter!(
        "fishing_game_broadcasts_total",
        "Actuator broadcasts by result"
    );
    describe_gauge!("fishing_game_score", "Score of the current round");
}

/// Records the start of a round.
pub fn record_round_started() {
    counter!("fishing_game_rounds_total").increment(1);
    gauge!("fishing_game_score").set(0.0);
}

/// Records a catch and the resulting score.
pub fn record_catch(score: u32) {
    counter!("fishing_game_catches_total").increment(1);
    gauge!("fishing_game_score").set(f64::from(score));
}

/// Records a catch on the wrong target.
pub fn record_miss() {
    counter!("fishing_game_misses_total").increment(1);
}

/// Records a target expiry.
pub fn record_timeout() {
    counter!("fishing_game_timeouts_total").increment(1);
}

/// Clears the score gauge.
pub fn record_reset() {
    gauge!("fishing_game_score").set(0.0);
}

/// Records a broadcast attempt.
pub fn record_broadcast(delivered: bool) {
    let result = if delivered { "sent" } else { "dropped" };
    counter!("fishing_game_broadcasts_total", "result" => result).increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recording_without_recorder_is_noop() {
        record_round_started();
        record_catch(3);
        record_miss();
        record_timeout();
        record_reset();
        record_broadcast(true);
        record_broadcast(false);
    }

    #[test]
    fn init_metrics_twice_is_ok() {
        assert!(init_metrics(None).is_ok());
        assert!(init_metrics(None).is_ok());
    }
}
