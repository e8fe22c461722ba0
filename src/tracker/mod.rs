//! Session tracking core.
//!
//! Everything in here is deterministic: the state machine consumes
//! timestamps and observations supplied by the caller and never reaches
//! into the OS, the clock, or the database on its own.

pub mod session;
pub mod targets;

pub use session::SessionTracker;
pub use targets::TargetSet;
