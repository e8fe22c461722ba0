//! The per-tick session state machine.
//!
//! [`SessionTracker`] owns one [`SessionState`] per application that has
//! been seen alive since its last completed session. Each tick it is fed
//! the current focus observation and a liveness oracle, moves every state
//! forward, and returns the sessions that closed during that tick. The
//! tracker itself never talks to the OS or the database; the driver wires
//! those in, which keeps this module deterministic and testable with a
//! fake clock.

use chrono::{DateTime, Utc};
use std::collections::HashMap;

use crate::inspect::FocusedProcess;
use crate::storage::CompletedSession;

use super::targets::TargetSet;

/// In-memory state for one tracked application.
///
/// Exists iff the app has been observed alive or focused since its last
/// completed session. `total_start` never changes; `focus_accumulated`
/// only grows; `focus_start` is `Some` exactly while `is_focused`.
#[derive(Debug, Clone)]
pub struct SessionState {
    /// Executable path captured when the session opened.
    app_path: String,
    /// First sighting in this continuous lifetime.
    total_start: DateTime<Utc>,
    /// Start of the currently open focus interval, if focused.
    focus_start: Option<DateTime<Utc>>,
    /// Closed focus time in seconds, excluding any open interval.
    focus_accumulated: i64,
    /// Whether the app currently holds the foreground window.
    is_focused: bool,
}

impl SessionState {
    fn open(app_path: String, now: DateTime<Utc>) -> Self {
        Self {
            app_path,
            total_start: now,
            focus_start: Some(now),
            focus_accumulated: 0,
            is_focused: true,
        }
    }

    fn gain_focus(&mut self, now: DateTime<Utc>) {
        self.is_focused = true;
        self.focus_start = Some(now);
    }

    fn lose_focus(&mut self, now: DateTime<Utc>) {
        self.is_focused = false;
        if let Some(focus_start) = self.focus_start.take() {
            self.focus_accumulated += elapsed_seconds(focus_start, now);
        }
    }

    /// Consumes the state into its immutable persisted record, folding any
    /// still-open focus interval into the accumulated total.
    fn close(mut self, app_name: &str, now: DateTime<Utc>) -> CompletedSession {
        if let Some(focus_start) = self.focus_start.take() {
            self.focus_accumulated += elapsed_seconds(focus_start, now);
        }

        CompletedSession {
            app_name: app_name.to_string(),
            app_path: self.app_path,
            total_start: self.total_start,
            end_time: now,
            focus_seconds: self.focus_accumulated,
            total_seconds: elapsed_seconds(self.total_start, now),
        }
    }

    /// Whether the app currently holds focus.
    pub fn is_focused(&self) -> bool {
        self.is_focused
    }

    /// Closed focus seconds accrued so far.
    pub fn focus_accumulated(&self) -> i64 {
        self.focus_accumulated
    }
}

/// Whole seconds between two instants, clamped at zero so a clock step
/// backwards cannot produce negative durations.
fn elapsed_seconds(start: DateTime<Utc>, end: DateTime<Utc>) -> i64 {
    (end - start).num_seconds().max(0)
}

/// The session-tracking state machine.
///
/// Passive: state only advances inside [`SessionTracker::tick`] and
/// [`SessionTracker::flush`], both driven by the poll loop.
pub struct SessionTracker {
    targets: TargetSet,
    sessions: HashMap<String, SessionState>,
}

impl SessionTracker {
    pub fn new(targets: TargetSet) -> Self {
        Self {
            targets,
            sessions: HashMap::new(),
        }
    }

    /// Advances every tracked session by one observation.
    ///
    /// `focused` is the process owning the foreground window (or `None`
    /// when indeterminate); `is_alive` answers whether any process with
    /// the given lower-cased name is still running. Returns the sessions
    /// that closed during this tick, in teardown order.
    ///
    /// Focus transitions are applied before the liveness check for the
    /// same app, so a session torn down this tick carries its fully closed
    /// focus interval. A failed focus observation only means "no active
    /// app"; sessions are torn down by liveness loss alone.
    pub fn tick(
        &mut self,
        now: DateTime<Utc>,
        focused: Option<FocusedProcess>,
        is_alive: &mut dyn FnMut(&str) -> bool,
    ) -> Vec<CompletedSession> {
        let active = focused.and_then(|p| {
            let name = p.name.to_lowercase();
            self.targets.matches(&name).then_some((name, p.path))
        });

        let mut completed = Vec::new();

        // Teardown removes entries mid-walk, so iterate a frozen snapshot
        // of the tracked keys.
        let tracked: Vec<String> = self.sessions.keys().cloned().collect();
        for app_name in tracked {
            let is_active = active.as_ref().is_some_and(|(name, _)| *name == app_name);

            if let Some(state) = self.sessions.get_mut(&app_name) {
                if is_active && !state.is_focused {
                    state.gain_focus(now);
                    tracing::info!(app = %app_name, "focus gained");
                } else if !is_active && state.is_focused {
                    state.lose_focus(now);
                    tracing::info!(
                        app = %app_name,
                        focus_seconds = state.focus_accumulated,
                        "focus lost"
                    );
                }
            }

            if !is_alive(&app_name) {
                if let Some(state) = self.sessions.remove(&app_name) {
                    let session = state.close(&app_name, now);
                    tracing::info!(
                        app = %app_name,
                        focus_seconds = session.focus_seconds,
                        total_seconds = session.total_seconds,
                        "session ended"
                    );
                    completed.push(session);
                }
            }
        }

        if let Some((app_name, app_path)) = active {
            // A stale focus observation can still name an app whose
            // liveness check failed above; do not resurrect it in the
            // tick that tore it down.
            let died_this_tick = completed.iter().any(|s| s.app_name == app_name);
            if !died_this_tick && !self.sessions.contains_key(&app_name) {
                tracing::info!(app = %app_name, path = %app_path, "session started");
                self.sessions
                    .insert(app_name, SessionState::open(app_path, now));
            }
        }

        completed
    }

    /// Force-closes every open session, as if each had failed its liveness
    /// check at `now`. Used by the driver's shutdown flush so no open
    /// session is silently dropped.
    pub fn flush(&mut self, now: DateTime<Utc>) -> Vec<CompletedSession> {
        let mut completed = Vec::new();
        let tracked: Vec<String> = self.sessions.keys().cloned().collect();

        for app_name in tracked {
            if let Some(state) = self.sessions.remove(&app_name) {
                let session = state.close(&app_name, now);
                tracing::info!(
                    app = %app_name,
                    focus_seconds = session.focus_seconds,
                    total_seconds = session.total_seconds,
                    "session flushed"
                );
                completed.push(session);
            }
        }

        completed
    }

    /// Number of currently open sessions.
    pub fn open_sessions(&self) -> usize {
        self.sessions.len()
    }

    /// The state for a tracked app, if open.
    pub fn session(&self, app_name: &str) -> Option<&SessionState> {
        self.sessions.get(app_name)
    }
}
