//! Error taxonomy for Focuslog.
//!
//! Three failure classes with very different handling:
//!
//! - [`Error::Config`]: missing or malformed configuration. Fatal to
//!   startup, never retried.
//! - [`Error::Persistence`]: a completed session failed to write. The
//!   record is lost (at-most-once persistence), tracking continues.
//! - [`Error::Inspection`]: an OS call for focus or process information
//!   failed. Routine and transient; treated as "no focused app" for the
//!   tick that observed it.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("failed to persist session for {app}")]
    Persistence {
        app: String,
        #[source]
        source: rusqlite::Error,
    },

    #[error("focus inspection failed: {0}")]
    Inspection(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_message() {
        let err = Error::Config("target_apps must not be empty".to_string());
        assert_eq!(
            err.to_string(),
            "invalid configuration: target_apps must not be empty"
        );
    }

    #[test]
    fn test_persistence_error_names_the_app() {
        let err = Error::Persistence {
            app: "notepad.exe".to_string(),
            source: rusqlite::Error::InvalidQuery,
        };
        assert!(err.to_string().contains("notepad.exe"));
    }
}
