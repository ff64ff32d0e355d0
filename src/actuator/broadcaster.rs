//! Fire-and-forget sender.

use tracing::{debug, warn};

use crate::observability::metrics;
use crate::transport::BroadcastLink;

use super::command::ActuatorCommand;

/// Send counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BroadcastStats {
    /// Payloads accepted by the link
    pub sent: u64,
    /// Payloads the link refused (dropped, never retried)
    pub failed: u64,
}

/// Mirrors game state onto the remote indicators.
///
/// Without a link every send is a no-op; with one, failures are logged,
/// counted and forgotten.
pub struct ActuatorBroadcaster {
    link: Option<Box<dyn BroadcastLink>>,
    stats: BroadcastStats,
    last: Option<ActuatorCommand>,
}

impl ActuatorBroadcaster {
    /// Creates a broadcaster over an optional link.
    #[must_use]
    pub fn new(link: Option<Box<dyn BroadcastLink>>) -> Self {
        Self {
            link,
            stats: BroadcastStats::default(),
            last: None,
        }
    }

    /// A broadcaster with no link.
    #[must_use]
    pub fn disconnected() -> Self {
        Self::new(None)
    }

    /// Sends `command` once. Returns whether the link accepted it.
    pub fn send(&mut self, command: ActuatorCommand) -> bool {
        self.last = Some(command);
        let Some(link) = self.link.as_mut() else {
            return false;
        };
        match link.broadcast(&command.to_payload()) {
            Ok(()) => {
                debug!(%command, link = %link.link_type(), "broadcast");
                self.stats.sent += 1;
                metrics::record_broadcast(true);
                true
            }
            Err(error) => {
                warn!(%command, %error, "broadcast dropped");
                self.stats.failed += 1;
                metrics::record_broadcast(false);
                false
            }
        }
    }

    /// Last command handed to `send`, delivered or not.
    #[must_use]
    pub const fn last(&self) -> Option<ActuatorCommand> {
        self.last
    }

    /// Send counters.
    #[must_use]
    pub const fn stats(&self) -> BroadcastStats {
        self.stats
    }

    /// Whether a link is attached.
    #[must_use]
    pub const fn is_connected(&self) -> bool {
        self.link.is_some()
    }
}

impl std::fmt::Debug for ActuatorBroadcaster {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActuatorBroadcaster")
            .field("connected", &self.is_connected())
            .field("stats", &self.stats)
            .field("last", &self.last)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::TargetId;
    use crate::transport::MemoryLink;

    #[test]
    fn test_send_records_payload() {
        let link = MemoryLink::new();
        let mut broadcaster = ActuatorBroadcaster::new(Some(Box::new(link.clone())));
        assert!(broadcaster.send(ActuatorCommand::Target(TargetId::new(1))));
        assert!(broadcaster.send(ActuatorCommand::Off));
        assert_eq!(link.sent(), vec!["2", "OFF"]);
        assert_eq!(broadcaster.stats().sent, 2);
    }

    #[test]
    fn test_failure_is_swallowed_and_not_retried() {
        let link = MemoryLink::new();
        link.set_failing(true);
        let mut broadcaster = ActuatorBroadcaster::new(Some(Box::new(link.clone())));
        assert!(!broadcaster.send(ActuatorCommand::All));
        link.set_failing(false);
        assert!(broadcaster.send(ActuatorCommand::Off));
        assert_eq!(link.sent(), vec!["OFF"]);
        assert_eq!(
            broadcaster.stats(),
            BroadcastStats { sent: 1, failed: 1 }
        );
    }

    #[test]
    fn test_disconnected_tracks_last_command() {
        let mut broadcaster = ActuatorBroadcaster::disconnected();
        assert!(!broadcaster.send(ActuatorCommand::All));
        assert_eq!(broadcaster.last(), Some(ActuatorCommand::All));
        assert_eq!(broadcaster.stats(), BroadcastStats::default());
    }
}
