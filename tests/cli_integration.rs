//! Integration tests for focuslog.
//!
//! These tests exercise the CLI commands through their underlying library
//! functions using temporary directories to ensure test isolation.

use chrono::{DateTime, Duration, TimeZone, Utc};
use std::collections::HashSet;
use tempfile::tempdir;

use focuslog::config::Config;
use focuslog::error::Error;
use focuslog::inspect::FocusedProcess;
use focuslog::storage::{CompletedSession, Database, SessionStore};
use focuslog::tracker::{SessionTracker, TargetSet};

// =============================================================================
// Test Helpers
// =============================================================================

/// Creates a test database in a temporary directory.
/// Returns the Database instance and the temp directory (which must be kept alive).
fn create_test_db() -> (Database, tempfile::TempDir) {
    let dir = tempdir().expect("Failed to create temp directory");
    let db_path = dir.path().join("test.db");
    let db = Database::open(&db_path).expect("Failed to open test database");
    (db, dir)
}

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
}

fn at(seconds: i64) -> DateTime<Utc> {
    t0() + Duration::seconds(seconds)
}

fn focus(name: &str) -> Option<FocusedProcess> {
    Some(FocusedProcess {
        name: name.to_string(),
        path: format!("/usr/bin/{name}"),
    })
}

fn session_at(app: &str, start: DateTime<Utc>, focus: i64, total: i64) -> CompletedSession {
    CompletedSession {
        app_name: app.to_string(),
        app_path: format!("/usr/bin/{app}"),
        total_start: start,
        end_time: start + Duration::seconds(total),
        focus_seconds: focus,
        total_seconds: total,
    }
}

// =============================================================================
// Config Tests
// =============================================================================

mod config_tests {
    use super::*;

    #[test]
    fn test_config_round_trip_through_disk() {
        let dir = tempdir().expect("Failed to create temp directory");
        let path = dir.path().join("config.json");

        let config = Config {
            target_apps: vec!["notepad".to_string(), "chrome".to_string()],
            check_interval_secs: 0.5,
            db_path: dir.path().join("focuslog.db").to_string_lossy().into_owned(),
        };
        config.save_to(&path).expect("Failed to save config");

        let loaded = Config::load_from(&path).expect("Failed to load config");
        assert_eq!(loaded.target_apps, config.target_apps);
        assert_eq!(loaded.check_interval_secs, config.check_interval_secs);
        assert_eq!(loaded.db_path, config.db_path);
    }

    #[test]
    fn test_invalid_config_never_reaches_disk() {
        let dir = tempdir().expect("Failed to create temp directory");
        let path = dir.path().join("config.json");

        let config = Config {
            target_apps: vec![],
            check_interval_secs: 0.5,
            db_path: "x.db".to_string(),
        };

        let err = config.save_to(&path).expect_err("Empty targets must be rejected");
        assert!(matches!(err, Error::Config(_)));
        assert!(!path.exists(), "Rejected config should not be written");
    }
}

// =============================================================================
// Tracker-to-Database Tests
// =============================================================================

mod tracking_tests {
    use super::*;

    /// One scripted tick: (offset seconds, focused process, alive names).
    type Tick<'a> = (i64, Option<&'a str>, &'a [&'a str]);

    /// Replays a tick script through a fresh tracker and appends every
    /// completed session to the database, the way the poll driver does.
    fn record_script(db: &Database, targets: &[&str], script: &[Tick], flush_at: i64) {
        let owned: Vec<String> = targets.iter().map(|s| s.to_string()).collect();
        let mut tracker =
            SessionTracker::new(TargetSet::new(&owned).expect("Failed to build target set"));

        let mut completed = Vec::new();
        for (t, name, alive) in script {
            let alive: HashSet<&str> = alive.iter().copied().collect();
            completed.extend(tracker.tick(at(*t), name.and_then(focus), &mut |n| {
                alive.contains(n)
            }));
        }
        completed.extend(tracker.flush(at(flush_at)));

        for session in &completed {
            db.append(session).expect("Failed to append session");
        }
    }

    #[test]
    fn test_tracked_day_is_reconstructable_from_the_database() {
        let (db, _dir) = create_test_db();

        // notepad: two lifetimes (0-10 and 30-40); chrome: one (5-40)
        let script: &[Tick] = &[
            (0, Some("notepad.exe"), &["notepad.exe"]),
            (5, Some("chrome.exe"), &["notepad.exe", "chrome.exe"]),
            (10, Some("chrome.exe"), &["chrome.exe"]),
            (30, Some("notepad.exe"), &["notepad.exe", "chrome.exe"]),
            (40, None, &[]),
        ];
        record_script(&db, &["notepad", "chrome"], script, 45);

        let day = t0().date_naive();

        let notepad = db
            .sessions_for_day("notepad.exe", day)
            .expect("Failed to query");
        assert_eq!(notepad.len(), 2, "Two notepad lifetimes, two records");
        assert_eq!(notepad[0].total_start, at(0));
        assert_eq!(notepad[0].total_seconds, 10);
        assert_eq!(notepad[0].focus_seconds, 5);
        assert_eq!(notepad[1].total_start, at(30));

        let chrome_stats = db
            .stats_for_day("chrome.exe", day)
            .expect("Failed to query")
            .expect("Chrome stats should exist");
        assert_eq!(chrome_stats.opens, 1);
        // Focused 5-30, unfocused 30-40
        assert_eq!(chrome_stats.focus_seconds, 25);
        assert_eq!(chrome_stats.total_seconds, 35);
    }

    #[test]
    fn test_focus_sum_never_exceeds_total_sum() {
        let (db, _dir) = create_test_db();

        let script: &[Tick] = &[
            (0, Some("notepad.exe"), &["notepad.exe"]),
            (3, None, &["notepad.exe"]),
            (7, Some("notepad.exe"), &["notepad.exe"]),
            (9, Some("chrome.exe"), &["notepad.exe"]),
            (15, Some("notepad.exe"), &["notepad.exe"]),
        ];
        record_script(&db, &["notepad"], script, 20);

        let stats = db
            .stats_for_day("notepad.exe", t0().date_naive())
            .expect("Failed to query")
            .expect("Stats should exist");

        assert!(stats.focus_seconds <= stats.total_seconds);
        assert_eq!(stats.total_seconds, 20);
        assert_eq!(stats.focus_seconds, 3 + 2 + 5);
    }

    #[test]
    fn test_replaying_the_same_day_twice_doubles_the_stats() {
        // The tracker is deterministic: identical observations produce
        // identical records, so a double replay exactly doubles the sums.
        let (db, _dir) = create_test_db();

        let script: &[Tick] = &[
            (0, Some("notepad.exe"), &["notepad.exe"]),
            (4, None, &["notepad.exe"]),
        ];
        record_script(&db, &["notepad"], script, 10);
        record_script(&db, &["notepad"], script, 10);

        let stats = db
            .stats_for_day("notepad.exe", t0().date_naive())
            .expect("Failed to query")
            .expect("Stats should exist");

        assert_eq!(stats.opens, 2);
        assert_eq!(stats.focus_seconds, 8);
        assert_eq!(stats.total_seconds, 20);
    }
}

// =============================================================================
// Stats Query Tests
// =============================================================================

mod stats_tests {
    use super::*;

    #[test]
    fn test_day_boundary_splits_stats() {
        let (db, _dir) = create_test_db();
        let day_one = Utc.with_ymd_and_hms(2024, 3, 1, 23, 0, 0).unwrap();
        let day_two = Utc.with_ymd_and_hms(2024, 3, 2, 1, 0, 0).unwrap();

        db.append(&session_at("notepad.exe", day_one, 10, 20))
            .expect("Failed to append");
        db.append(&session_at("notepad.exe", day_two, 30, 40))
            .expect("Failed to append");

        let first = db
            .stats_for_day("notepad.exe", day_one.date_naive())
            .expect("Failed to query")
            .expect("Stats should exist");
        assert_eq!(first.opens, 1);
        assert_eq!(first.total_seconds, 20);

        let second = db
            .stats_for_day("notepad.exe", day_two.date_naive())
            .expect("Failed to query")
            .expect("Stats should exist");
        assert_eq!(second.opens, 1);
        assert_eq!(second.total_seconds, 40);

        let all_time = db
            .stats_all_time("notepad.exe")
            .expect("Failed to query")
            .expect("Stats should exist");
        assert_eq!(all_time.opens, 2);
        assert_eq!(all_time.total_seconds, 60);
        assert_eq!(all_time.first_use, day_one);
    }

    #[test]
    fn test_app_names_reflect_recorded_sessions() {
        let (db, _dir) = create_test_db();

        assert!(db.app_names().expect("Failed to query").is_empty());

        db.append(&session_at("notepad.exe", t0(), 1, 2))
            .expect("Failed to append");
        db.append(&session_at("chrome.exe", t0(), 1, 2))
            .expect("Failed to append");

        let names = db.app_names().expect("Failed to query");
        assert_eq!(names, vec!["chrome.exe", "notepad.exe"]);
    }

    #[test]
    fn test_session_count_spans_all_apps() {
        let (db, _dir) = create_test_db();

        for i in 0..3 {
            db.append(&session_at("notepad.exe", at(i * 100), 1, 2))
                .expect("Failed to append");
        }
        db.append(&session_at("chrome.exe", t0(), 1, 2))
            .expect("Failed to append");

        assert_eq!(db.session_count().expect("Failed to count"), 4);
    }
}
