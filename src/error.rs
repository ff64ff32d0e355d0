//! Error types for the fishing game
//!
//! The hierarchy mirrors how failures are handled at runtime: configuration
//! errors are fatal at setup, peripheral errors disable a capability, protocol
//! errors are swallowed at the send site and command errors are ignored.

use std::path::PathBuf;
use thiserror::Error;

// ============================================================================
// Exit Codes
// ============================================================================

/// Process exit codes for CLI operations.
pub struct ExitCode;

impl ExitCode {
    /// Successful execution
    pub const SUCCESS: i32 = 0;

    /// General error
    pub const ERROR: i32 = 1;

    /// Configuration error (invalid YAML, validation failure, bad timer setup)
    pub const CONFIG_ERROR: i32 = 2;

    /// I/O error (file not found, permission denied)
    pub const IO_ERROR: i32 = 3;

    /// Transport error (socket could not be opened)
    pub const TRANSPORT_ERROR: i32 = 4;

    /// Usage error (invalid arguments, missing required options)
    pub const USAGE_ERROR: i32 = 64;

    /// Interrupted by SIGINT (Ctrl+C)
    pub const INTERRUPTED: i32 = 130;

    /// Terminated by SIGTERM
    pub const TERMINATED: i32 = 143;
}

// ============================================================================
// Top-Level Error
// ============================================================================

/// Top-level error type for game operations.
///
/// Only the variants that can block startup ever reach `main`; everything
/// raised inside the control loop is handled where the peripheral lives.
#[derive(Debug, Error)]
pub enum GameError {
    /// Configuration loading or validation error
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Timer could not be configured
    #[error(transparent)]
    Timer(#[from] TimerError),

    /// Peripheral initialization failure that the caller chose not to tolerate
    #[error(transparent)]
    Peripheral(#[from] PeripheralError),

    /// Broadcast link failure
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl GameError {
    /// Returns the appropriate exit code for this error.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) | Self::Timer(_) | Self::Yaml(_) => ExitCode::CONFIG_ERROR,
            Self::Protocol(_) | Self::Peripheral(_) => ExitCode::TRANSPORT_ERROR,
            Self::Io(_) => ExitCode::IO_ERROR,
        }
    }
}

// ============================================================================
// Timer Errors
// ============================================================================

/// Deadline timer configuration errors.
///
/// These are the timer half of the configuration error class: they are
/// raised while the engine is being built and prevent the game from starting.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimerError {
    /// Duration is zero or negative
    #[error("timer '{timer}' has a non-positive duration ({millis} ms)")]
    NonPositiveDuration {
        /// Name of the timer being configured
        timer: String,
        /// Offending duration in milliseconds
        millis: i64,
    },

    /// Duration cannot be measured with wrapping millisecond ticks
    #[error("timer '{timer}' duration {millis} ms exceeds the {limit} ms tick window")]
    DurationOutOfRange {
        /// Name of the timer being configured
        timer: String,
        /// Offending duration in milliseconds
        millis: i64,
        /// Largest measurable duration
        limit: u32,
    },

    /// Timer was armed without an expiry handler
    #[error("timer '{timer}' has no expiry callback")]
    MissingCallback {
        /// Name of the timer being armed
        timer: String,
    },
}

// ============================================================================
// Configuration Errors
// ============================================================================

/// Configuration loading and validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// YAML parsing failed
    #[error("parse error in {path}{}: {message}", line.map_or_else(String::new, |l| format!(" (line {l})")))]
    ParseError {
        /// Path to the configuration file
        path: PathBuf,
        /// Line number where the error occurred (if available)
        line: Option<usize>,
        /// Error message from the parser
        message: String,
    },

    /// Configuration validation failed
    #[error("validation failed for {path}: {}", summarize(errors))]
    ValidationError {
        /// Path to the configuration file
        path: String,
        /// List of validation issues found
        errors: Vec<ValidationIssue>,
    },

    /// Referenced configuration file not found
    #[error("file not found: {path}")]
    MissingFile {
        /// Path to the missing file
        path: PathBuf,
    },

    /// Field has an invalid value
    #[error("invalid value for '{field}': got '{value}', expected {expected}")]
    InvalidValue {
        /// Name of the field with invalid value
        field: String,
        /// The actual value provided
        value: String,
        /// Description of what was expected
        expected: String,
    },

    /// Environment variable referenced in configuration is not set
    #[error("environment variable '{var}' not set (referenced at line {line})")]
    EnvVarNotSet {
        /// Name of the environment variable
        var: String,
        /// Line in the configuration where it was referenced
        line: usize,
    },
}

fn summarize(issues: &[ValidationIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

// ============================================================================
// Validation Types
// ============================================================================

/// A single validation issue found during configuration validation.
#[derive(Debug, Clone)]
pub struct ValidationIssue {
    /// Path to the problematic field (e.g., "inputs.sensors[2].threshold")
    pub path: String,
    /// Description of the validation issue
    pub message: String,
    /// Severity level of the issue
    pub severity: Severity,
}

impl std::fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let prefix = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        write!(f, "{}: {} at {}", prefix, self.message, self.path)
    }
}

/// Severity level for validation issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Validation failure that prevents the configuration from being used
    Error,
    /// Potential issue that does not prevent loading
    Warning,
}

// ============================================================================
// Peripheral Errors
// ============================================================================

/// A sensor, button, display or radio could not be brought up.
///
/// Never fatal inside the game loop: the capability is disabled and the
/// loop carries on without it.
#[derive(Debug, Error)]
pub enum PeripheralError {
    /// Peripheral failed to initialize or stopped responding
    #[error("peripheral '{peripheral}' unavailable: {reason}")]
    Unavailable {
        /// Peripheral name (e.g. "sensor[3]", "display.time")
        peripheral: String,
        /// Human-readable failure reason
        reason: String,
    },
}

impl PeripheralError {
    /// Convenience constructor.
    pub fn unavailable(peripheral: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Unavailable {
            peripheral: peripheral.into(),
            reason: reason.into(),
        }
    }
}

// ============================================================================
// Protocol Errors
// ============================================================================

/// Broadcast send failures.
///
/// Raised by a [`BroadcastLink`](crate::transport::BroadcastLink) and
/// swallowed by the broadcaster.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// I/O error on the underlying link
    #[error("send failed: {0}")]
    Io(#[from] std::io::Error),

    /// The link refused the payload without blocking (queue full)
    #[error("send would block; payload dropped")]
    WouldBlock,

    /// Payload exceeds what the link can carry in one frame
    #[error("payload of {len} bytes exceeds the {max} byte frame limit")]
    PayloadTooLarge {
        /// Payload length
        len: usize,
        /// Frame limit of the link
        max: usize,
    },

    /// Link has been shut down
    #[error("link closed")]
    Closed,
}

// ============================================================================
// Command Errors
// ============================================================================

/// Malformed debug input or unrecognized wireless payload.
///
/// Callers ignore these; they exist so parsers can say why.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    /// Payload is not valid UTF-8
    #[error("payload is not valid UTF-8")]
    NotUtf8,

    /// Payload is not part of the vocabulary
    #[error("unrecognized command '{0}'")]
    Unrecognized(String),

    /// Target number outside 1..=N
    #[error("target {number} out of range 1..={targets}")]
    TargetOutOfRange {
        /// Parsed one-based target number
        number: usize,
        /// Number of targets in play
        targets: usize,
    },
}

// ============================================================================
// Result Type Alias
// ============================================================================

/// Result type alias for game operations.
pub type Result<T> = std::result::Result<T, GameError>;

// ============================================================================
// Tests
// ============================================================================
