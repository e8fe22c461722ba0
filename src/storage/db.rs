//! SQLite storage layer for Focuslog.

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection};
use std::path::Path;

use super::models::{AllTimeStats, CompletedSession, DayStats};
use crate::error::Error;

/// Durable store for completed sessions.
///
/// The tracker only needs a single append operation. Each record gets one
/// write attempt; a failed append loses that record rather than risking
/// duplicate accounting on retry.
pub trait SessionStore {
    fn append(&self, session: &CompletedSession) -> Result<(), Error>;
}

/// Database connection wrapper.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Opens or creates the database and runs migrations.
    pub fn open(path: &Path) -> rusqlite::Result<Self> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Run migrations.
    fn migrate(&self) -> rusqlite::Result<()> {
        self.conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS app_sessions (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                app_name TEXT NOT NULL,
                app_path TEXT,
                total_start TEXT NOT NULL,
                end_time TEXT NOT NULL,
                focus_seconds INTEGER NOT NULL,
                total_seconds INTEGER NOT NULL,
                date TEXT NOT NULL
            );

            -- Reporting queries filter by app name and day
            CREATE INDEX IF NOT EXISTS idx_app_sessions_name_date
                ON app_sessions(app_name, date);
            "#,
        )?;
        Ok(())
    }

    /// Inserts a completed session.
    pub fn insert_session(&self, session: &CompletedSession) -> rusqlite::Result<()> {
        self.conn.execute(
            r#"
            INSERT INTO app_sessions
                (app_name, app_path, total_start, end_time, focus_seconds, total_seconds, date)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                session.app_name,
                session.app_path,
                session.total_start.to_rfc3339(),
                session.end_time.to_rfc3339(),
                session.focus_seconds,
                session.total_seconds,
                session.end_time.date_naive().to_string(),
            ],
        )?;
        Ok(())
    }

    /// Aggregates for one app on one day. Returns `None` when no sessions
    /// were recorded that day.
    pub fn stats_for_day(&self, app_name: &str, date: NaiveDate) -> rusqlite::Result<Option<DayStats>> {
        let stats = self.conn.query_row(
            r#"
            SELECT
                COUNT(*),
                COALESCE(SUM(focus_seconds), 0),
                COALESCE(SUM(total_seconds), 0),
                COALESCE(AVG(total_seconds), 0.0)
            FROM app_sessions
            WHERE app_name = ?1 AND date = ?2
            "#,
            params![app_name, date.to_string()],
            |row| {
                Ok(DayStats {
                    opens: row.get(0)?,
                    focus_seconds: row.get(1)?,
                    total_seconds: row.get(2)?,
                    avg_total_seconds: row.get(3)?,
                })
            },
        )?;

        Ok((stats.opens > 0).then_some(stats))
    }

    /// Aggregates for one app across all recorded history.
    pub fn stats_all_time(&self, app_name: &str) -> rusqlite::Result<Option<AllTimeStats>> {
        let row = self.conn.query_row(
            r#"
            SELECT
                COUNT(*),
                COALESCE(SUM(focus_seconds), 0),
                COALESCE(SUM(total_seconds), 0),
                MIN(total_start)
            FROM app_sessions
            WHERE app_name = ?1
            "#,
            params![app_name],
            |row| {
                let opens: i64 = row.get(0)?;
                let focus_seconds: i64 = row.get(1)?;
                let total_seconds: i64 = row.get(2)?;
                let first_use: Option<String> = row.get(3)?;
                Ok((opens, focus_seconds, total_seconds, first_use))
            },
        )?;

        let (opens, focus_seconds, total_seconds, first_use) = row;
        let Some(first_use) = first_use else {
            return Ok(None);
        };

        Ok(Some(AllTimeStats {
            opens,
            focus_seconds,
            total_seconds,
            first_use: parse_timestamp(&first_use, 3)?,
        }))
    }

    /// All sessions for one app on one day, ordered by start time.
    pub fn sessions_for_day(
        &self,
        app_name: &str,
        date: NaiveDate,
    ) -> rusqlite::Result<Vec<CompletedSession>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT app_name, app_path, total_start, end_time, focus_seconds, total_seconds
            FROM app_sessions
            WHERE app_name = ?1 AND date = ?2
            ORDER BY total_start
            "#,
        )?;

        let rows = stmt.query_map(params![app_name, date.to_string()], |row| {
            Ok(CompletedSession {
                app_name: row.get(0)?,
                app_path: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
                total_start: parse_timestamp(&row.get::<_, String>(2)?, 2)?,
                end_time: parse_timestamp(&row.get::<_, String>(3)?, 3)?,
                focus_seconds: row.get(4)?,
                total_seconds: row.get(5)?,
            })
        })?;

        rows.collect()
    }

    /// Distinct app names with recorded sessions, alphabetically.
    pub fn app_names(&self) -> rusqlite::Result<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT DISTINCT app_name FROM app_sessions ORDER BY app_name")?;
        let rows = stmt.query_map([], |row| row.get(0))?;
        rows.collect()
    }

    /// Total number of stored sessions, across all apps.
    pub fn session_count(&self) -> rusqlite::Result<i64> {
        self.conn
            .query_row("SELECT COUNT(*) FROM app_sessions", [], |row| row.get(0))
    }
}

impl SessionStore for Database {
    fn append(&self, session: &CompletedSession) -> Result<(), Error> {
        self.insert_session(session).map_err(|e| Error::Persistence {
            app: session.app_name.clone(),
            source: e,
        })
    }
}

/// Parses an RFC 3339 column back into a UTC timestamp.
fn parse_timestamp(raw: &str, column: usize) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(
                column,
                rusqlite::types::Type::Text,
                Box::new(e),
            )
        })
}
