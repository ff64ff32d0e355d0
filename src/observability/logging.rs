//! Logging initialization.
//!
//! Logs go to stderr so stdout stays free for the console displays. The
//! `-v` flags raise the game's own level; dependency crates (tokio, the
//! metrics exporter, hyper under it) stay at `warn` until `-vvv`.
//! `FISHING_GAME_LOG_LEVEL` replaces the whole filter.

use std::io::IsTerminal;
use tracing_subscriber::EnvFilter;

use crate::cli::args::ColorChoice;

/// Environment variable that overrides the verbosity flags.
pub const LOG_LEVEL_ENV: &str = "FISHING_GAME_LOG_LEVEL";

/// Target prefix of this crate's own events.
const GAME_TARGET: &str = "fishing_game";

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum LogFormat {
    /// Human-readable format with optional ANSI colors.
    #[default]
    Human,
    /// Newline-delimited JSON, one object per event.
    Json,
}

/// Filter directives for a `-v` count.
///
/// - 0: everything at `warn`
/// - 1: game events at `info`, dependencies at `warn`
/// - 2: game events at `debug`, dependencies at `warn`
/// - 3+: everything at `trace`
#[must_use]
pub fn default_directives(verbosity: u8) -> String {
    match verbosity {
        0 => "warn".to_string(),
        1 => format!("warn,{GAME_TARGET}=info"),
        2 => format!("warn,{GAME_TARGET}=debug"),
        _ => "trace".to_string(),
    }
}

fn use_ansi(color: ColorChoice) -> bool {
    match color {
        ColorChoice::Auto => {
            std::io::stderr().is_terminal() && std::env::var_os("NO_COLOR").is_none()
        }
        ColorChoice::Always => true,
        ColorChoice::Never => false,
    }
}

/// Installs the global subscriber.
///
/// Safe to call more than once; later calls are ignored.
pub fn init_logging(format: LogFormat, verbosity: u8, color: ColorChoice) {
    let filter = EnvFilter::try_from_env(LOG_LEVEL_ENV)
        .unwrap_or_else(|_| EnvFilter::new(default_directives(verbosity)));

    // Module paths only help once per-tick detail is on.
    let show_target = verbosity >= 2;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(show_target)
        .with_writer(std::io::stderr);

    let _ = match format {
        LogFormat::Human => builder.with_ansi(use_ansi(color)).try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
}
