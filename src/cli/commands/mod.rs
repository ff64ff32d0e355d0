//! Command handlers.

pub mod play;
pub mod receive;
pub mod validate;
pub mod version;

use tokio_util::sync::CancellationToken;

use crate::cli::args::{Cli, Commands};
use crate::error::GameError;

/// Dispatches the parsed CLI to the matching command handler.
///
/// # Errors
///
/// Returns an error if the selected command fails.
pub async fn dispatch(cli: Cli, cancel: CancellationToken) -> Result<(), GameError> {
    match cli.command {
        Commands::Play(args) => play::run(&args, cancel).await,
        Commands::Receive(args) => receive::run(&args, cancel).await,
        Commands::Validate(args) => validate::run(&args),
        Commands::Version(args) => {
            version::run(&args);
            Ok(())
        }
    }
}
