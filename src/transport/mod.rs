//! Broadcast links
//!
//! A [`BroadcastLink`] carries one small datagram to every listener on a
//! fixed broadcast address: no addressing, no acknowledgement, no retry.
//! On the board this is the radio; on the host it is a UDP socket.

pub mod memory;
pub mod udp;

pub use memory::MemoryLink;
pub use udp::UdpBroadcastLink;

use std::fmt;

use crate::error::ProtocolError;

/// Largest payload carried in a single frame (the ESP-NOW frame limit).
pub const MAX_PAYLOAD: usize = 250;

/// One-way, unacknowledged datagram sender.
///
/// `broadcast` must never block: a link that cannot take the payload right
/// now reports [`ProtocolError::WouldBlock`] and the payload is lost.
pub trait BroadcastLink: Send {
    /// Sends `payload` to every listener.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError`] if the payload could not be handed to the
    /// link. Callers log and drop it.
    fn broadcast(&mut self, payload: &[u8]) -> Result<(), ProtocolError>;

    /// Link type, for logs and metrics.
    fn link_type(&self) -> LinkType;
}

/// Link type identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LinkType {
    /// UDP broadcast socket
    Udp,
    /// In-process recorder
    Memory,
}

impl fmt::Display for LinkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Udp => write!(f, "udp"),
            Self::Memory => write!(f, "memory"),
        }
    }
}

/// Rejects payloads above [`MAX_PAYLOAD`].
///
/// # Errors
///
/// Returns [`ProtocolError::PayloadTooLarge`] when the payload does not fit.
pub const fn check_payload(payload: &[u8]) -> Result<(), ProtocolError> {
    if payload.len() > MAX_PAYLOAD {
        return Err(ProtocolError::PayloadTooLarge {
            len: payload.len(),
            max: MAX_PAYLOAD,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_link_type_display() {
        assert_eq!(LinkType::Udp.to_string(), "udp");
        assert_eq!(LinkType::Memory.to_string(), "memory");
    }

    #[test]
    fn test_check_payload_limit() {
        assert!(check_payload(&[0; MAX_PAYLOAD]).is_ok());
        assert!(matches!(
            check_payload(&[0; MAX_PAYLOAD + 1]),
            Err(ProtocolError::PayloadTooLarge { len: 251, max: 250 })
        ));
    }
}
