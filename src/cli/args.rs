//! CLI argument definitions
//!
//! All Clap derive structs for `fishing-game` command-line parsing.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};

use crate::observability::LogFormat;

// ============================================================================
// Root CLI
// ============================================================================

/// Timed target-acquisition game for hall-sensor boards.
#[derive(Parser, Debug)]
#[command(name = "fishing-game", author, version, about)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all non-error output.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Color output control.
    #[arg(long, default_value = "auto", global = true, env = "FISHING_GAME_COLOR")]
    pub color: ColorChoice,

    /// Log output format.
    #[arg(long, default_value = "human", global = true, env = "FISHING_GAME_LOG_FORMAT")]
    pub log_format: LogFormat,
}

// ============================================================================
// Commands
// ============================================================================

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the game on this host with console displays and UDP indicators.
    Play(PlayArgs),

    /// Act as the remote indicator set, listening for broadcast commands.
    Receive(ReceiveArgs),

    /// Validate configuration files without running the game.
    Validate(ValidateArgs),

    /// Display version information.
    Version(VersionArgs),
}

/// Arguments for `play`.
#[derive(Args, Debug)]
pub struct PlayArgs {
    /// Path to YAML configuration file (defaults apply when omitted).
    #[arg(short, long, env = "FISHING_GAME_CONFIG")]
    pub config: Option<PathBuf>,

    /// Write game events as JSON lines to this file.
    #[arg(long, env = "FISHING_GAME_EVENTS_FILE")]
    pub events_file: Option<PathBuf>,

    /// Expose Prometheus metrics on 127.0.0.1:<PORT>.
    #[arg(long, env = "FISHING_GAME_METRICS_PORT")]
    pub metrics_port: Option<u16>,

    /// Do not open the broadcast link.
    #[arg(long)]
    pub no_radio: bool,

    /// Seed for the target sequence.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Do not read debug commands from stdin.
    #[arg(long)]
    pub no_console: bool,

    /// Stop after this long (e.g. `90s`); runs until interrupted otherwise.
    #[arg(long, value_parser = humantime::parse_duration)]
    pub exit_after: Option<Duration>,
}

/// Arguments for `receive`.
#[derive(Args, Debug)]
pub struct ReceiveArgs {
    /// Address to listen on.
    #[arg(long, default_value = "0.0.0.0:4210", env = "FISHING_GAME_RECEIVE_BIND")]
    pub bind: SocketAddr,

    /// Number of indicators.
    #[arg(long, default_value_t = 5, value_parser = clap::value_parser!(u8).range(1..=9))]
    pub targets: u8,
}

/// Arguments for `validate`.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Configuration files to validate.
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Treat warnings as errors.
    #[arg(long)]
    pub strict: bool,
}

/// Arguments for `version`.
#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Output format.
    #[arg(short, long, default_value = "human")]
    pub format: OutputFormat,
}

// ============================================================================
// CLI-Local Enums
// ============================================================================

/// Color output choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ColorChoice {
    /// Auto-detect terminal support.
    #[default]
    Auto,
    /// Always use color.
    Always,
    /// Never use color.
    Never,
}

/// Output format for structured output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output.
    #[default]
    Human,
    /// JSON output.
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_play_flags() {
        let cli = Cli::try_parse_from([
            "fishing-game",
            "-vv",
            "play",
            "--no-radio",
            "--seed",
            "42",
            "--exit-after",
            "1500ms",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Play(args) => {
                assert!(args.no_radio);
                assert_eq!(args.seed, Some(42));
                assert_eq!(args.exit_after, Some(Duration::from_millis(1500)));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn receive_rejects_ten_targets() {
        assert!(Cli::try_parse_from(["fishing-game", "receive", "--targets", "10"]).is_err());
    }

    #[test]
    fn validate_requires_files() {
        assert!(Cli::try_parse_from(["fishing-game", "validate"]).is_err());
    }
}
