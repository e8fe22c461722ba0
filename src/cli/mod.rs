//! Command-line interface for focuslog.
//!
//! Provides the CLI commands for configuring the tracker, running it in
//! the foreground or as a daemon, and querying recorded usage.

/// Individual CLI command implementations.
pub mod commands;

/// Shared output formatting helpers.
pub mod format;
