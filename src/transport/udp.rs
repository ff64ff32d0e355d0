//! UDP broadcast link.
//!
//! Host stand-in for the radio. The socket is non-blocking and every send
//! goes through `try_send_to`, so a full socket buffer drops the payload
//! instead of stalling the control loop.

use std::io;
use std::net::SocketAddr;

use tokio::net::UdpSocket;
use tracing::debug;

use crate::error::ProtocolError;

use super::{BroadcastLink, LinkType, MAX_PAYLOAD, check_payload};

/// Broadcast sender over a UDP socket with `SO_BROADCAST` set.
#[derive(Debug)]
pub struct UdpBroadcastLink {
    socket: UdpSocket,
    destination: SocketAddr,
}

impl UdpBroadcastLink {
    /// Binds `bind` and targets `destination`.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::Io`] if the socket cannot be bound or
    /// broadcast cannot be enabled.
    pub async fn open(bind: SocketAddr, destination: SocketAddr) -> Result<Self, ProtocolError> {
        let socket = UdpSocket::bind(bind).await?;
        socket.set_broadcast(true)?;
        debug!(local = %socket.local_addr()?, %destination, "broadcast link open");
        Ok(Self {
            socket,
            destination,
        })
    }

    /// Address payloads are sent to.
    #[must_use]
    pub const fn destination(&self) -> SocketAddr {
        self.destination
    }

    /// Locally bound address.
    ///
    /// # Errors
    ///
    /// Returns the underlying socket error.
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.socket.local_addr()
    }
}

impl BroadcastLink for UdpBroadcastLink {
    fn broadcast(&mut self, payload: &[u8]) -> Result<(), ProtocolError> {
        check_payload(payload)?;
        match self.socket.try_send_to(payload, self.destination) {
            Ok(_) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => Err(ProtocolError::WouldBlock),
            Err(e) => Err(ProtocolError::Io(e)),
        }
    }

    fn link_type(&self) -> LinkType {
        LinkType::Udp
    }
}

/// Binds a socket for receiving broadcast commands.
///
/// # Errors
///
/// Returns the bind error.
pub async fn bind_listener(bind: SocketAddr) -> io::Result<UdpSocket> {
    let socket = UdpSocket::bind(bind).await?;
    debug!(local = %socket.local_addr()?, "listening for broadcast commands");
    Ok(socket)
}

/// Receive buffer large enough for any frame.
#[must_use]
pub const fn frame_buffer() -> [u8; MAX_PAYLOAD] {
    [0; MAX_PAYLOAD]
}
