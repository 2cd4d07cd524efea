//! Relational store module
//!
//! One SQLite file holding the `gallery` and `events` tables. The connection
//! lives behind a mutex so request handlers can share the store; SQLite
//! itself serializes writers.

mod events;
mod gallery;
mod tags;
pub mod timestamp;

pub use events::{Event, NewEvent};
pub use gallery::{GalleryImage, NewGalleryImage};
pub use tags::Tags;

use rusqlite::Connection;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use thiserror::Error;

use crate::logger;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS gallery (
    id              INTEGER PRIMARY KEY AUTOINCREMENT,
    title           TEXT NOT NULL,
    description     TEXT,
    image_filename  TEXT NOT NULL,
    image_url       TEXT,
    upload_date     TEXT NOT NULL,
    is_featured     INTEGER NOT NULL DEFAULT 0,
    tags            TEXT
);

CREATE TABLE IF NOT EXISTS events (
    id              INTEGER PRIMARY KEY AUTOINCREMENT,
    title           TEXT NOT NULL,
    description     TEXT NOT NULL,
    event_date      TEXT NOT NULL,
    location        TEXT,
    image_filename  TEXT,
    image_url       TEXT,
    is_featured     INTEGER NOT NULL DEFAULT 0,
    is_past         INTEGER NOT NULL DEFAULT 0,
    created_date    TEXT NOT NULL,
    ticket_url      TEXT,
    tags            TEXT
);

CREATE INDEX IF NOT EXISTS idx_gallery_upload_date ON gallery(upload_date DESC);
CREATE INDEX IF NOT EXISTS idx_events_event_date ON events(event_date);
";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("database is closed")]
    Closed,
}

/// SQLite-backed record store
pub struct Store {
    conn: Mutex<Option<Connection>>,
    db_path: PathBuf,
}

impl Store {
    /// Open (or create) the database file and make sure both tables exist
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let db_path = path.as_ref().to_path_buf();
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(&db_path)?;
        Self::init_schema(&conn)?;
        logger::log_info(&format!("[Store] Database ready at {}", db_path.display()));

        Ok(Self {
            conn: Mutex::new(Some(conn)),
            db_path,
        })
    }

    /// Open a throwaway in-memory database
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        Self::init_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(Some(conn)),
            db_path: PathBuf::from(":memory:"),
        })
    }

    fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
        conn.execute_batch(SCHEMA)
    }

    pub fn path(&self) -> &Path {
        &self.db_path
    }

    /// Run `f` against the open connection
    fn with_conn<T>(
        &self,
        f: impl FnOnce(&Connection) -> rusqlite::Result<T>,
    ) -> Result<T, StoreError> {
        let guard = self.conn.lock().unwrap_or_else(PoisonError::into_inner);
        let conn = guard.as_ref().ok_or(StoreError::Closed)?;
        Ok(f(conn)?)
    }

    /// Cheap round trip used by the readiness check
    pub fn ping(&self) -> Result<(), StoreError> {
        self.with_conn(|conn| conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0)))
            .map(|_| ())
    }

    /// Close the connection; later calls fail with [`StoreError::Closed`]
    pub fn close(&self) -> Result<(), StoreError> {
        let conn = self
            .conn
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
            .ok_or(StoreError::Closed)?;
        conn.close().map_err(|(_, e)| StoreError::Sqlite(e))
    }
}
