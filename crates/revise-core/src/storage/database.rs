//! SQLite-backed store for exams, preferences and the current timetable.
//!
//! Provides persistent storage for:
//! - Exams the learner has entered
//! - Availability preferences (JSON in the key-value table)
//! - The most recently generated timetable, replaced wholesale on save

use std::path::Path;

use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension};

use super::data_dir;
use crate::error::{DatabaseError, Result};
use crate::schedule::{Block, Exam, Preferences, Session};

const PREFERENCES_KEY: &str = "preferences";

/// SQLite database for timetable storage.
pub struct TimetableDb {
    conn: Connection,
}

impl TimetableDb {
    /// Open the database at `~/.config/revise/revise.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self> {
        let path = data_dir()?.join("revise.db");
        Self::open_at(&path)
    }

    /// Open (or create) a database file at `path`.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open_at(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).map_err(|source| DatabaseError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Open an in-memory database.
    ///
    /// # Errors
    /// Returns an error if the schema cannot be created.
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<(), rusqlite::Error> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS exams (
                id          TEXT PRIMARY KEY,
                subject     TEXT NOT NULL,
                exam_date   TEXT NOT NULL,
                time_of_day TEXT NOT NULL,
                board       TEXT,
                teacher     TEXT
            );

            CREATE TABLE IF NOT EXISTS sessions (
                id             TEXT PRIMARY KEY,
                position       INTEGER NOT NULL,
                date           TEXT NOT NULL,
                block          TEXT NOT NULL,
                subject        TEXT NOT NULL,
                start_time     TEXT NOT NULL,
                end_time       TEXT NOT NULL,
                forced_subject TEXT
            );

            CREATE TABLE IF NOT EXISTS kv (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_exams_exam_date ON exams(exam_date);
            CREATE INDEX IF NOT EXISTS idx_sessions_position ON sessions(position);",
        )?;
        Ok(())
    }

    /// Insert or replace an exam.
    ///
    /// # Errors
    /// Returns an error if the insert fails.
    pub fn add_exam(&self, exam: &Exam) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO exams (id, subject, exam_date, time_of_day, board, teacher)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                exam.id,
                exam.subject,
                exam.exam_date.format("%Y-%m-%d").to_string(),
                exam.time_of_day.as_str(),
                exam.board,
                exam.teacher,
            ],
        )?;
        Ok(())
    }

    /// All exams, earliest first.
    ///
    /// # Errors
    /// Returns an error if the query fails or a row cannot be decoded.
    pub fn list_exams(&self) -> Result<Vec<Exam>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, subject, exam_date, time_of_day, board, teacher
             FROM exams ORDER BY exam_date, rowid",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, Option<String>>(4)?,
                row.get::<_, Option<String>>(5)?,
            ))
        })?;

        let mut exams = Vec::new();
        for row in rows {
            let (id, subject, exam_date, time_of_day, board, teacher) = row?;
            exams.push(Exam {
                id,
                subject,
                exam_date: decode_date("exams", &exam_date)?,
                time_of_day: decode_block("exams", &time_of_day)?,
                board,
                teacher,
            });
        }
        Ok(exams)
    }

    /// Remove an exam. Returns whether a row was deleted.
    ///
    /// # Errors
    /// Returns an error if the delete fails.
    pub fn remove_exam(&self, id: &str) -> Result<bool> {
        let deleted = self
            .conn
            .execute("DELETE FROM exams WHERE id = ?1", params![id])?;
        Ok(deleted > 0)
    }

    /// Store preferences, replacing any previous ones.
    ///
    /// # Errors
    /// Returns an error if serialization or the write fails.
    pub fn save_preferences(&self, preferences: &Preferences) -> Result<()> {
        let json = serde_json::to_string(preferences)?;
        self.kv_set(PREFERENCES_KEY, &json)?;
        Ok(())
    }

    /// Stored preferences, if any.
    ///
    /// # Errors
    /// Returns an error if the read fails or the stored JSON is invalid.
    pub fn load_preferences(&self) -> Result<Option<Preferences>> {
        match self.kv_get(PREFERENCES_KEY)? {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    /// Replace the stored timetable with `sessions`, atomically.
    ///
    /// # Errors
    /// Returns an error if any statement fails; the previous timetable is
    /// kept in that case.
    pub fn replace_sessions(&mut self, sessions: &[Session]) -> Result<()> {
        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM sessions", [])?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO sessions
                 (id, position, date, block, subject, start_time, end_time, forced_subject)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            )?;
            for (position, session) in sessions.iter().enumerate() {
                stmt.execute(params![
                    session.id,
                    position as i64,
                    session.date.format("%Y-%m-%d").to_string(),
                    session.block.as_str(),
                    session.subject,
                    session.start_time,
                    session.end_time,
                    session.forced_subject,
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    /// The stored timetable in generation order.
    ///
    /// # Errors
    /// Returns an error if the query fails or a row cannot be decoded.
    pub fn list_sessions(&self) -> Result<Vec<Session>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, date, block, subject, start_time, end_time, forced_subject
             FROM sessions ORDER BY position",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, String>(4)?,
                row.get::<_, String>(5)?,
                row.get::<_, Option<String>>(6)?,
            ))
        })?;

        let mut sessions = Vec::new();
        for row in rows {
            let (id, date, block, subject, start_time, end_time, forced_subject) = row?;
            sessions.push(Session {
                id,
                date: decode_date("sessions", &date)?,
                block: decode_block("sessions", &block)?,
                subject,
                start_time,
                end_time,
                forced_subject,
            });
        }
        Ok(sessions)
    }

    /// Get a value from the kv store.
    pub fn kv_get(&self, key: &str) -> Result<Option<String>, rusqlite::Error> {
        self.conn
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                row.get::<_, String>(0)
            })
            .optional()
    }

    /// Set a value in the kv store.
    pub fn kv_set(&self, key: &str, value: &str) -> Result<(), rusqlite::Error> {
        self.conn.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }
}

fn decode_date(table: &str, raw: &str) -> Result<NaiveDate, DatabaseError> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|e| DatabaseError::CorruptRow {
        table: table.to_string(),
        message: format!("bad date '{raw}': {e}"),
    })
}

fn decode_block(table: &str, raw: &str) -> Result<Block, DatabaseError> {
    raw.parse::<Block>().map_err(|message| DatabaseError::CorruptRow {
        table: table.to_string(),
        message,
    })
}
