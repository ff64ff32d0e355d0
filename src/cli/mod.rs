//! Command-line interface
//!
//! Argument definitions and command handlers for the `fishing-game` binary.

pub mod args;
pub mod commands;
