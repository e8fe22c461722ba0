//! Storage layer for Focuslog.

pub mod db;
pub mod models;

pub use db::{Database, SessionStore};
pub use models::*;
