//! The poll driver: one tick per interval.
//!
//! Composes the three collaborators of a tracking run: an
//! [`Inspector`] for focus and liveness, the [`SessionTracker`] state
//! machine, and a [`SessionStore`] for completed sessions. The driver is
//! the only place these meet; ticks never overlap because `poll_once` is
//! plain synchronous code invoked from a single loop.

use chrono::Utc;
use std::time::Duration;

use crate::error::Error;
use crate::inspect::Inspector;
use crate::storage::{CompletedSession, SessionStore};
use crate::tracker::SessionTracker;

pub struct PollDriver<I: Inspector, S: SessionStore> {
    tracker: SessionTracker,
    inspector: I,
    store: S,
    interval: Duration,
}

impl<I: Inspector, S: SessionStore> PollDriver<I, S> {
    pub fn new(tracker: SessionTracker, inspector: I, store: S, interval: Duration) -> Self {
        Self {
            tracker,
            inspector,
            store,
            interval,
        }
    }

    /// Seconds between ticks. A lower bound on tick spacing, not a
    /// real-time deadline.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Number of sessions currently open in the tracker.
    pub fn open_sessions(&self) -> usize {
        self.tracker.open_sessions()
    }

    /// Runs one observe/update/persist cycle.
    ///
    /// A failed focus query is routine (window transitions, lock screens)
    /// and downgrades to "no active app" for this tick. A failed persist
    /// is surfaced after every emitted session got its single write
    /// attempt; the in-memory state is already gone, so the record is
    /// lost rather than double-counted.
    pub fn poll_once(&mut self) -> Result<(), Error> {
        // One process-table snapshot serves every liveness query this tick
        self.inspector.refresh();

        let focused = match self.inspector.focused_process() {
            Ok(focused) => focused,
            Err(e) => {
                tracing::debug!("focus inspection failed, treating as no active app: {e}");
                None
            }
        };

        let now = Utc::now();
        let inspector = &mut self.inspector;
        let completed = self
            .tracker
            .tick(now, focused, &mut |name| inspector.is_process_alive(name));

        self.persist(completed).map(|_| ())
    }

    /// Force-closes every open session and persists the records. Called
    /// on shutdown so normal termination never drops an open session.
    pub fn flush(&mut self) -> Result<usize, Error> {
        let completed = self.tracker.flush(Utc::now());
        self.persist(completed)
    }

    fn persist(&mut self, completed: Vec<CompletedSession>) -> Result<usize, Error> {
        let count = completed.len();
        let mut result = Ok(count);

        for session in &completed {
            if let Err(e) = self.store.append(session) {
                tracing::error!(app = %session.app_name, "failed to persist session: {e}");
                result = Err(e);
            }
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inspect::FocusedProcess;
    use crate::tracker::TargetSet;
    use std::cell::RefCell;
    use std::collections::HashSet;
    use std::collections::VecDeque;
    use std::rc::Rc;

    /// Scripted inspector: pops one focus observation per tick and
    /// answers liveness from a mutable set.
    struct FakeInspector {
        focus_script: VecDeque<Result<Option<FocusedProcess>, Error>>,
        alive: HashSet<String>,
        refreshes: usize,
    }

    impl FakeInspector {
        fn new() -> Self {
            Self {
                focus_script: VecDeque::new(),
                alive: HashSet::new(),
                refreshes: 0,
            }
        }

        fn push_focus(&mut self, name: &str) {
            self.focus_script.push_back(Ok(Some(FocusedProcess {
                name: name.to_string(),
                path: format!("/usr/bin/{name}"),
            })));
        }

        fn push_no_focus(&mut self) {
            self.focus_script.push_back(Ok(None));
        }

        fn push_failure(&mut self) {
            self.focus_script
                .push_back(Err(Error::Inspection("display gone".to_string())));
        }

        fn set_alive(&mut self, names: &[&str]) {
            self.alive = names.iter().map(|s| s.to_string()).collect();
        }
    }

    impl Inspector for FakeInspector {
        fn focused_process(&mut self) -> Result<Option<FocusedProcess>, Error> {
            self.focus_script.pop_front().unwrap_or(Ok(None))
        }

        fn refresh(&mut self) {
            self.refreshes += 1;
        }

        fn is_process_alive(&mut self, lower_name: &str) -> bool {
            self.alive.contains(lower_name)
        }
    }

    /// Store that records appends and optionally fails every write.
    #[derive(Clone)]
    struct FakeStore {
        appended: Rc<RefCell<Vec<CompletedSession>>>,
        fail: Rc<RefCell<bool>>,
    }

    impl FakeStore {
        fn new() -> Self {
            Self {
                appended: Rc::new(RefCell::new(Vec::new())),
                fail: Rc::new(RefCell::new(false)),
            }
        }
    }

    impl SessionStore for FakeStore {
        fn append(&self, session: &CompletedSession) -> Result<(), Error> {
            if *self.fail.borrow() {
                return Err(Error::Persistence {
                    app: session.app_name.clone(),
                    source: rusqlite::Error::InvalidQuery,
                });
            }
            self.appended.borrow_mut().push(session.clone());
            Ok(())
        }
    }

    fn driver(
        targets: &[&str],
        inspector: FakeInspector,
        store: FakeStore,
    ) -> PollDriver<FakeInspector, FakeStore> {
        let owned: Vec<String> = targets.iter().map(|s| s.to_string()).collect();
        let tracker = SessionTracker::new(TargetSet::new(&owned).expect("Failed to build targets"));
        PollDriver::new(tracker, inspector, store, Duration::from_millis(500))
    }

    #[test]
    fn test_full_cycle_persists_completed_session() {
        let mut inspector = FakeInspector::new();
        inspector.push_focus("notepad.exe");
        inspector.push_focus("notepad.exe");
        inspector.set_alive(&["notepad.exe"]);

        let store = FakeStore::new();
        let mut driver = driver(&["notepad"], inspector, store.clone());

        driver.poll_once().expect("Tick should succeed");
        assert_eq!(driver.open_sessions(), 1);

        // Process dies before the second tick
        driver.inspector.set_alive(&[]);
        driver.poll_once().expect("Tick should succeed");

        assert_eq!(driver.open_sessions(), 0);
        let appended = store.appended.borrow();
        assert_eq!(appended.len(), 1);
        assert_eq!(appended[0].app_name, "notepad.exe");
    }

    #[test]
    fn test_inspection_failure_is_a_no_focus_tick() {
        let mut inspector = FakeInspector::new();
        inspector.push_focus("notepad.exe");
        inspector.push_failure();
        inspector.set_alive(&["notepad.exe"]);

        let store = FakeStore::new();
        let mut driver = driver(&["notepad"], inspector, store.clone());

        driver.poll_once().expect("Tick should succeed");
        driver.poll_once().expect("Failed inspection must not error the tick");

        // Session survives; only liveness loss tears down
        assert_eq!(driver.open_sessions(), 1);
        assert!(store.appended.borrow().is_empty());
    }

    #[test]
    fn test_persistence_failure_is_surfaced_and_state_stays_removed() {
        let mut inspector = FakeInspector::new();
        inspector.push_focus("notepad.exe");
        inspector.push_no_focus();
        inspector.set_alive(&["notepad.exe"]);

        let store = FakeStore::new();
        let mut driver = driver(&["notepad"], inspector, store.clone());

        driver.poll_once().expect("Tick should succeed");

        driver.inspector.set_alive(&[]);
        *store.fail.borrow_mut() = true;

        let err = driver.poll_once().expect_err("Write failure must surface");
        assert!(matches!(err, Error::Persistence { .. }));

        // At-most-once: the state is gone, nothing is re-queued
        assert_eq!(driver.open_sessions(), 0);
        *store.fail.borrow_mut() = false;
        driver.poll_once().expect("Tick should succeed");
        assert!(store.appended.borrow().is_empty());
    }

    #[test]
    fn test_one_process_table_snapshot_per_tick() {
        let mut inspector = FakeInspector::new();
        inspector.push_focus("notepad.exe");
        inspector.push_focus("chrome.exe");
        inspector.set_alive(&["notepad.exe", "chrome.exe"]);

        let store = FakeStore::new();
        let mut driver = driver(&["notepad", "chrome"], inspector, store);

        driver.poll_once().expect("Tick should succeed");
        driver.poll_once().expect("Tick should succeed");
        assert_eq!(driver.open_sessions(), 2);

        // Two tracked apps queried for liveness, still one snapshot per tick
        assert_eq!(driver.inspector.refreshes, 2);
    }

    #[test]
    fn test_flush_persists_every_open_session_once() {
        let mut inspector = FakeInspector::new();
        inspector.push_focus("notepad.exe");
        inspector.push_focus("chrome.exe");
        inspector.set_alive(&["notepad.exe", "chrome.exe"]);

        let store = FakeStore::new();
        let mut driver = driver(&["notepad", "chrome"], inspector, store.clone());

        driver.poll_once().expect("Tick should succeed");
        driver.poll_once().expect("Tick should succeed");
        assert_eq!(driver.open_sessions(), 2);

        let flushed = driver.flush().expect("Flush should succeed");
        assert_eq!(flushed, 2);
        assert_eq!(store.appended.borrow().len(), 2);

        // Second flush finds nothing
        assert_eq!(driver.flush().expect("Flush should succeed"), 0);
        assert_eq!(store.appended.borrow().len(), 2);
    }
}
