//! Persisted session records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One finished tracking session for an application.
///
/// Created exactly once when the tracker tears a session down (process
/// death or shutdown flush) and immutable from then on. Durations are
/// whole seconds; `focus_seconds` counts only the intervals in which the
/// app held the foreground window, `total_seconds` the whole span from
/// first sighting to teardown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletedSession {
    /// Lower-cased process name (e.g. "notepad.exe").
    pub app_name: String,

    /// Full executable path captured when the session opened.
    pub app_path: String,

    /// When the application was first observed in this lifetime.
    pub total_start: DateTime<Utc>,

    /// When the session was torn down.
    pub end_time: DateTime<Utc>,

    /// Seconds the application held focus.
    pub focus_seconds: i64,

    /// Seconds between `total_start` and `end_time`.
    pub total_seconds: i64,
}

/// Aggregate numbers for one app on one day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayStats {
    /// Number of completed sessions.
    pub opens: i64,
    /// Summed focus seconds.
    pub focus_seconds: i64,
    /// Summed total seconds.
    pub total_seconds: i64,
    /// Mean total seconds per session.
    pub avg_total_seconds: f64,
}

/// Aggregate numbers for one app across all recorded history.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AllTimeStats {
    /// Number of completed sessions.
    pub opens: i64,
    /// Summed focus seconds.
    pub focus_seconds: i64,
    /// Summed total seconds.
    pub total_seconds: i64,
    /// Start of the earliest recorded session.
    pub first_use: DateTime<Utc>,
}
