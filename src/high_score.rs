use chrono::Local;
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::HashMap;
use std::path::Path;

use crate::app_dirs::AppDirs;
use crate::error::StoreError;
use crate::mode::Mode;

/// Best score per mode. A missing record reads as 0.
pub trait HighScoreStore {
    fn get(&self, mode: Mode) -> Result<u32, StoreError>;

    /// Persists `candidate` only if it beats the stored best. Returns true when
    /// a new record was written.
    fn set_if_greater(&mut self, mode: Mode, candidate: u32) -> Result<bool, StoreError>;

    /// Drops the record so `get` reports 0 again.
    fn clear(&mut self, mode: Mode) -> Result<(), StoreError>;
}

impl<S: HighScoreStore + ?Sized> HighScoreStore for Box<S> {
    fn get(&self, mode: Mode) -> Result<u32, StoreError> {
        (**self).get(mode)
    }

    fn set_if_greater(&mut self, mode: Mode, candidate: u32) -> Result<bool, StoreError> {
        (**self).set_if_greater(mode, candidate)
    }

    fn clear(&mut self, mode: Mode) -> Result<(), StoreError> {
        (**self).clear(mode)
    }
}

/// SQLite-backed records under the user's state directory
#[derive(Debug)]
pub struct SqliteHighScoreStore {
    conn: Connection,
}

impl SqliteHighScoreStore {
    /// Open the database at the default location, creating it if needed
    pub fn new() -> Result<Self, StoreError> {
        let path = AppDirs::db_path().ok_or(StoreError::Unavailable)?;
        Self::open(path)
    }

    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        log::debug!("opening high score database at {}", path.display());
        Self::with_connection(Connection::open(path)?)
    }

    pub fn in_memory() -> Result<Self, StoreError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, StoreError> {
        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS high_scores (
                mode_key TEXT PRIMARY KEY,
                score INTEGER NOT NULL,
                updated_at TEXT NOT NULL
            )
            "#,
            [],
        )?;
        Ok(Self { conn })
    }

    fn read(conn: &Connection, mode: Mode) -> rusqlite::Result<u32> {
        let score: Option<u32> = conn
            .query_row(
                "SELECT score FROM high_scores WHERE mode_key = ?1",
                [mode.key()],
                |row| row.get(0),
            )
            .optional()?;
        Ok(score.unwrap_or(0))
    }
}

impl HighScoreStore for SqliteHighScoreStore {
    fn get(&self, mode: Mode) -> Result<u32, StoreError> {
        Ok(Self::read(&self.conn, mode)?)
    }

    fn set_if_greater(&mut self, mode: Mode, candidate: u32) -> Result<bool, StoreError> {
        let tx = self.conn.transaction()?;

        let best = Self::read(&tx, mode)?;
        if candidate <= best {
            return Ok(false);
        }

        tx.execute(
            r#"
            INSERT INTO high_scores (mode_key, score, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(mode_key) DO UPDATE SET
                score = excluded.score,
                updated_at = excluded.updated_at
            "#,
            params![mode.key(), candidate, Local::now().to_rfc3339()],
        )?;
        tx.commit()?;

        log::info!("new {mode} record: {candidate} (was {best})");
        Ok(true)
    }

    fn clear(&mut self, mode: Mode) -> Result<(), StoreError> {
        self.conn.execute(
            "DELETE FROM high_scores WHERE mode_key = ?1",
            [mode.key()],
        )?;
        Ok(())
    }
}

/// Volatile store for tests and for running without a writable state dir
#[derive(Debug, Clone, Default)]
pub struct MemoryHighScoreStore {
    records: HashMap<Mode, u32>,
}

impl MemoryHighScoreStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_record(mut self, mode: Mode, score: u32) -> Self {
        self.records.insert(mode, score);
        self
    }
}

impl HighScoreStore for MemoryHighScoreStore {
    fn get(&self, mode: Mode) -> Result<u32, StoreError> {
        Ok(self.records.get(&mode).copied().unwrap_or(0))
    }

    fn set_if_greater(&mut self, mode: Mode, candidate: u32) -> Result<bool, StoreError> {
        let best = self.records.entry(mode).or_insert(0);
        if candidate > *best {
            *best = candidate;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    fn clear(&mut self, mode: Mode) -> Result<(), StoreError> {
        self.records.remove(&mode);
        Ok(())
    }
}
