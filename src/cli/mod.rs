//! Command-line interface for sessioncheck.
//!
//! Provides commands for validating single sessions, all sessions of a
//! subject, and session folder names.

mod commands;

pub use commands::{parse_cli, run, run_with_cli, Cli, Commands};
