//! `receive`: the remote indicator set.
//!
//! Listens for broadcast commands and lights one virtual indicator per
//! target, printing the pattern each time it changes.

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::actuator::{ActuatorCommand, ActuatorReceiver};
use crate::cli::args::ReceiveArgs;
use crate::error::GameError;
use crate::peripherals::{DigitalOutput, VirtualBoard};
use crate::transport::udp::{bind_listener, frame_buffer};

/// Receives commands until cancelled.
///
/// # Errors
///
/// Returns an I/O error if the listen address cannot be bound.
pub async fn run(args: &ReceiveArgs, cancel: CancellationToken) -> Result<(), GameError> {
    let socket = bind_listener(args.bind).await?;
    info!(bind = %socket.local_addr()?, targets = args.targets, "listening for indicator commands");

    let pins: Vec<String> = (0..args.targets).map(|i| format!("D{}", i + 2)).collect();
    let mut board = VirtualBoard::new(pins.iter().cloned());
    let outputs: Vec<Box<dyn DigitalOutput>> = pins
        .iter()
        .filter_map(|pin| board.level(pin))
        .map(|level| Box::new(level) as Box<dyn DigitalOutput>)
        .collect();
    let mut receiver = ActuatorReceiver::new(outputs);
    println!("[indicators] {}", receiver.pattern());

    let mut buf = frame_buffer();
    loop {
        tokio::select! {
            () = cancel.cancelled() => break,
            received = socket.recv_from(&mut buf) => match received {
                Ok((len, from)) => {
                    let before = receiver.pattern();
                    if receiver.handle(&buf[..len]).is_ok() {
                        let after = receiver.pattern();
                        if after != before {
                            println!("[indicators] {after}");
                        }
                    } else {
                        debug!(%from, len, "ignored datagram");
                    }
                }
                Err(error) => warn!(%error, "receive failed"),
            },
        }
    }

    receiver.apply(ActuatorCommand::Off);
    info!("receiver stopped");
    Ok(())
}
