//! Configuration management.
//!
//! Focuslog reads a JSON config from `~/.focuslog/config.json`. The config
//! names the applications to track, the polling interval, and the database
//! path. It is loaded once at startup; monitoring runs never observe
//! mid-run edits.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::Error;

/// Smallest accepted polling interval, in seconds.
pub const MIN_CHECK_INTERVAL_SECS: f64 = 0.1;

/// Largest accepted polling interval, in seconds.
pub const MAX_CHECK_INTERVAL_SECS: f64 = 5.0;

/// Default polling interval, in seconds.
pub const DEFAULT_CHECK_INTERVAL_SECS: f64 = 0.5;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Application name substrings to track (matched case-insensitively).
    pub target_apps: Vec<String>,

    /// Seconds between polls of the foreground window.
    pub check_interval_secs: f64,

    /// Path to the SQLite session database.
    pub db_path: String,
}

impl Config {
    /// Builds a config for the given target apps with default interval and
    /// database path. Does not validate; call [`Config::validate`] or
    /// [`Config::save`].
    pub fn new(target_apps: Vec<String>) -> Result<Self, Error> {
        Ok(Self {
            target_apps,
            check_interval_secs: DEFAULT_CHECK_INTERVAL_SECS,
            db_path: default_db_path()?.to_string_lossy().into_owned(),
        })
    }

    /// Returns `~/.focuslog`, creating it if needed.
    pub fn config_dir() -> Result<PathBuf, Error> {
        let dir = dirs::home_dir()
            .ok_or_else(|| Error::Config("could not find home directory".to_string()))?
            .join(".focuslog");

        std::fs::create_dir_all(&dir)
            .map_err(|e| Error::Config(format!("failed to create {}: {e}", dir.display())))?;

        Ok(dir)
    }

    /// Path to the config file (`~/.focuslog/config.json`).
    pub fn config_path() -> Result<PathBuf, Error> {
        Ok(Self::config_dir()?.join("config.json"))
    }

    /// Loads and validates the config file.
    pub fn load() -> Result<Self, Error> {
        Self::load_from(&Self::config_path()?)
    }

    /// Loads and validates a config from an explicit path.
    pub fn load_from(path: &PathBuf) -> Result<Self, Error> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("config not found at {}: {e}", path.display())))?;

        let config: Config = serde_json::from_str(&raw)
            .map_err(|e| Error::Config(format!("config at {} is malformed: {e}", path.display())))?;

        config.validate()?;
        Ok(config)
    }

    /// Validates and writes the config to the default path.
    pub fn save(&self) -> Result<(), Error> {
        self.save_to(&Self::config_path()?)
    }

    /// Validates and writes the config to an explicit path.
    pub fn save_to(&self, path: &PathBuf) -> Result<(), Error> {
        self.validate()?;

        let json = serde_json::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("failed to serialize config: {e}")))?;

        std::fs::write(path, json)
            .map_err(|e| Error::Config(format!("failed to write {}: {e}", path.display())))?;

        Ok(())
    }

    /// Checks the invariants the tracker relies on: a non-empty target
    /// list with non-empty entries, and an interval within bounds.
    pub fn validate(&self) -> Result<(), Error> {
        if self.target_apps.is_empty() {
            return Err(Error::Config("target_apps must not be empty".to_string()));
        }

        if self.target_apps.iter().any(|app| app.trim().is_empty()) {
            return Err(Error::Config(
                "target_apps entries must not be blank".to_string(),
            ));
        }

        if !self.check_interval_secs.is_finite()
            || self.check_interval_secs < MIN_CHECK_INTERVAL_SECS
            || self.check_interval_secs > MAX_CHECK_INTERVAL_SECS
        {
            return Err(Error::Config(format!(
                "check_interval_secs must be between {MIN_CHECK_INTERVAL_SECS} and {MAX_CHECK_INTERVAL_SECS}"
            )));
        }

        if self.db_path.trim().is_empty() {
            return Err(Error::Config("db_path must not be empty".to_string()));
        }

        Ok(())
    }

    /// The polling interval as a [`std::time::Duration`].
    pub fn check_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs_f64(self.check_interval_secs)
    }

    /// The database path as a [`PathBuf`].
    pub fn db_path(&self) -> PathBuf {
        PathBuf::from(&self.db_path)
    }
}

/// Default database location (`~/.focuslog/focuslog.db`).
pub fn default_db_path() -> Result<PathBuf, Error> {
    Ok(Config::config_dir()?.join("focuslog.db"))
}
