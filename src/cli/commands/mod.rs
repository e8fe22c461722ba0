//! CLI commands for focuslog.
//!
//! Each submodule implements a single CLI command with its argument
//! parsing and execution logic.

/// Manage the list of tracked applications.
pub mod apps;

/// Daemon management (start, stop, status, logs).
pub mod daemon;

/// Create the initial configuration and database.
pub mod init;

/// Run the tracker interactively in the foreground.
pub mod run;

/// Show usage statistics for tracked applications.
pub mod stats;
