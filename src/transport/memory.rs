//! In-process link that records every payload.

use std::sync::{Arc, Mutex, PoisonError};

use crate::error::ProtocolError;

use super::{BroadcastLink, LinkType, check_payload};

#[derive(Debug, Default)]
struct Inner {
    sent: Vec<Vec<u8>>,
    failing: bool,
}

/// Recording link; clones share the same log.
#[derive(Debug, Clone, Default)]
pub struct MemoryLink {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryLink {
    /// Creates an empty link.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes subsequent sends fail (or succeed again).
    pub fn set_failing(&self, failing: bool) {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .failing = failing;
    }

    /// Every payload sent so far, decoded lossily.
    #[must_use]
    pub fn sent(&self) -> Vec<String> {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .sent
            .iter()
            .map(|p| String::from_utf8_lossy(p).into_owned())
            .collect()
    }

    /// Most recent payload.
    #[must_use]
    pub fn last(&self) -> Option<String> {
        self.sent().pop()
    }

    /// Forgets recorded payloads.
    pub fn clear(&self) {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .sent
            .clear();
    }
}

impl BroadcastLink for MemoryLink {
    fn broadcast(&mut self, payload: &[u8]) -> Result<(), ProtocolError> {
        check_payload(payload)?;
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        if inner.failing {
            return Err(ProtocolError::WouldBlock);
        }
        inner.sent.push(payload.to_vec());
        Ok(())
    }

    fn link_type(&self) -> LinkType {
        LinkType::Memory
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_log() {
        let link = MemoryLink::new();
        let mut sender = link.clone();
        sender.broadcast(b"ALL").unwrap();
        sender.broadcast(b"3").unwrap();
        assert_eq!(link.sent(), vec!["ALL", "3"]);
        assert_eq!(link.last().as_deref(), Some("3"));
    }

    #[test]
    fn test_failing_link_drops_payload() {
        let link = MemoryLink::new();
        let mut sender = link.clone();
        link.set_failing(true);
        assert!(sender.broadcast(b"OFF").is_err());
        link.set_failing(false);
        sender.broadcast(b"OFF").unwrap();
        assert_eq!(link.sent(), vec!["OFF"]);
    }
}
