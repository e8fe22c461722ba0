//! Focuslog - application focus time tracking
//!
//! Focuslog observes the foreground window and the process table,
//! tracks per-application sessions through focus and liveness changes,
//! and persists a record to SQLite each time a tracked application
//! exits.

pub mod config;
pub mod error;
pub mod inspect;
pub mod storage;
pub mod tracker;
