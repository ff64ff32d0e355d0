//! `fishing-game` - timed target-acquisition game

use clap::Parser;
use tokio_util::sync::CancellationToken;

use fishing_game::cli::args::Cli;
use fishing_game::cli::commands;
use fishing_game::error::ExitCode;
use fishing_game::observability::init_logging;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();

    if !cli.quiet {
        init_logging(cli.log_format, cli.verbose, cli.color);
    }

    // First signal stops the loop cleanly, the second exits immediately.
    let cancel = CancellationToken::new();
    let shutdown = cancel.clone();
    tokio::spawn(async move {
        wait_for_signal().await;
        eprintln!("\nShutting down gracefully... (press Ctrl+C again to force)");
        shutdown.cancel();
        std::process::exit(wait_for_signal().await);
    });

    match commands::dispatch(cli, cancel).await {
        Ok(()) => std::process::exit(ExitCode::SUCCESS),
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(e.exit_code());
        }
    }
}

/// Waits for SIGINT or SIGTERM and returns the matching exit code.
async fn wait_for_signal() -> i32 {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => tokio::select! {
                _ = tokio::signal::ctrl_c() => ExitCode::INTERRUPTED,
                _ = sigterm.recv() => ExitCode::TERMINATED,
            },
            Err(error) => {
                tracing::warn!(%error, "SIGTERM handler unavailable");
                let _ = tokio::signal::ctrl_c().await;
                ExitCode::INTERRUPTED
            }
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
        ExitCode::INTERRUPTED
    }
}
