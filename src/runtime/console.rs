//! Serial-console stand-in: characters typed on stdin.

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

/// Capacity of the character queue between the reader and the loop.
pub const DEBUG_QUEUE: usize = 64;

/// Spawns a task that forwards every character typed on stdin.
///
/// Input is line-buffered by the terminal; each line is split into its
/// characters. The task ends on EOF or when the loop drops the receiver.
#[must_use]
pub fn spawn_stdin_reader() -> (mpsc::Receiver<char>, JoinHandle<()>) {
    let (tx, rx) = mpsc::channel(DEBUG_QUEUE);
    let handle = tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            for ch in line.chars() {
                // A full queue means the loop is behind; drop the keystroke.
                if let Err(mpsc::error::TrySendError::Closed(_)) = tx.try_send(ch) {
                    return;
                }
            }
        }
        debug!("stdin closed");
    });
    (rx, handle)
}
