//! Daemon state management.
//!
//! The background monitor coordinates with CLI commands through files in
//! `~/.focuslog/`: a PID file marking the running instance and a log file
//! receiving its tracing output.

use anyhow::{Context, Result};
use std::fs;
use std::io::{Read, Write};
use std::path::PathBuf;

use crate::config::Config;

/// Paths and lifecycle for the daemon's runtime state.
pub struct DaemonState {
    /// Path to the PID file (`~/.focuslog/daemon.pid`).
    pub pid_file: PathBuf,
    /// Path to the log file (`~/.focuslog/daemon.log`).
    pub log_file: PathBuf,
}

impl DaemonState {
    /// Creates a DaemonState with default paths in `~/.focuslog/`.
    pub fn new() -> Result<Self> {
        let dir = Config::config_dir().context("Failed to prepare ~/.focuslog directory")?;

        Ok(Self {
            pid_file: dir.join("daemon.pid"),
            log_file: dir.join("daemon.log"),
        })
    }

    /// Whether a daemon instance is currently running.
    ///
    /// True if a PID file exists and the process with that PID is still
    /// alive.
    pub fn is_running(&self) -> bool {
        match self.get_pid() {
            Some(pid) => Self::process_exists(pid),
            None => false,
        }
    }

    /// The recorded daemon PID, if a readable PID file exists.
    pub fn get_pid(&self) -> Option<u32> {
        if !self.pid_file.exists() {
            return None;
        }

        let mut file = fs::File::open(&self.pid_file).ok()?;
        let mut contents = String::new();
        file.read_to_string(&mut contents).ok()?;

        contents.trim().parse().ok()
    }

    /// Writes the given process ID to the PID file.
    pub fn write_pid(&self, pid: u32) -> Result<()> {
        let mut file = fs::File::create(&self.pid_file).context("Failed to create PID file")?;
        write!(file, "{pid}").context("Failed to write PID")?;
        Ok(())
    }

    /// Removes the PID file. Missing files are not an error.
    pub fn cleanup(&self) -> Result<()> {
        if self.pid_file.exists() {
            fs::remove_file(&self.pid_file).context("Failed to remove PID file")?;
        }
        Ok(())
    }

    /// Checks if a process with the given PID exists.
    fn process_exists(pid: u32) -> bool {
        #[cfg(unix)]
        {
            // SAFETY: kill(pid, 0) only checks process existence without
            // delivering a signal.
            unsafe { libc::kill(pid as libc::pid_t, 0) == 0 }
        }

        #[cfg(not(unix))]
        {
            let _ = pid;
            true
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn create_test_state() -> (DaemonState, tempfile::TempDir) {
        let dir = tempdir().expect("Failed to create temp directory");
        let state = DaemonState {
            pid_file: dir.path().join("daemon.pid"),
            log_file: dir.path().join("daemon.log"),
        };
        (state, dir)
    }

    #[test]
    fn test_is_running_without_pid_file() {
        let (state, _dir) = create_test_state();
        assert!(!state.is_running());
        assert!(state.get_pid().is_none());
    }

    #[test]
    fn test_write_and_read_pid() {
        let (state, _dir) = create_test_state();

        state.write_pid(12345).expect("Failed to write PID");
        assert_eq!(state.get_pid(), Some(12345));
    }

    #[test]
    fn test_cleanup_removes_pid_file() {
        let (state, _dir) = create_test_state();

        state.write_pid(12345).expect("Failed to write PID");
        assert!(state.pid_file.exists());

        state.cleanup().expect("Failed to clean up");
        assert!(!state.pid_file.exists());

        // Cleanup on a missing file is fine
        state.cleanup().expect("Cleanup should be idempotent");
    }

    #[test]
    fn test_get_pid_invalid_content() {
        let (state, _dir) = create_test_state();

        fs::write(&state.pid_file, "not_a_number").expect("Failed to write file");
        assert!(state.get_pid().is_none());
    }

    #[test]
    fn test_own_pid_counts_as_running() {
        let (state, _dir) = create_test_state();

        state
            .write_pid(std::process::id())
            .expect("Failed to write PID");
        assert!(state.is_running());
    }
}
