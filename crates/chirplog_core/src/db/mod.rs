//! SQLite database layer for chirplog.

/// Search history storage helpers.
pub mod history;
/// Reading progress storage helpers.
pub mod progress;
/// Record storage and aggregate queries.
pub mod record;

use crate::error::AppError;
use rusqlite::Connection;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

#[cfg(test)]
mod tests;

const SCHEMA_VERSION: i32 = 1;

pub(crate) type SharedConnection = Arc<Mutex<Connection>>;

pub(crate) fn lock_conn(conn: &SharedConnection) -> Result<MutexGuard<'_, Connection>, AppError> {
    conn.lock()
        .map_err(|_| AppError::StorageMessage("database mutex poisoned".to_string()))
}

/// Database handle with per-concern accessors sharing one connection.
pub struct Database {
    conn: SharedConnection,
    path: PathBuf,
    pub records: record::RecordStore,
    pub history: history::SearchHistoryStore,
    pub progress: progress::ProgressStore,
}

fn open_connection(path: &Path) -> Result<Connection, AppError> {
    let conn = Connection::open(path)?;
    // Pragmas tuned for a single local writer.
    conn.execute_batch(
        "
        PRAGMA journal_mode = WAL;
        PRAGMA synchronous = NORMAL;
        PRAGMA temp_store = MEMORY;
        ",
    )?;
    Ok(conn)
}

fn get_schema_version(conn: &Connection) -> i32 {
    let result: Result<i32, _> = conn.query_row(
        "SELECT value FROM meta WHERE key = 'schema_version'",
        [],
        |row| {
            let value: String = row.get(0)?;
            Ok(value.parse().unwrap_or(0))
        },
    );

    // Treat a missing meta table as version 0.
    result.unwrap_or_default()
}

fn set_schema_version(conn: &Connection, version: i32) -> Result<(), AppError> {
    conn.execute(
        "INSERT OR REPLACE INTO meta (key, value) VALUES ('schema_version', ?1)",
        rusqlite::params![version.to_string()],
    )?;
    Ok(())
}

fn create_schema(conn: &Connection) -> Result<(), AppError> {
    conn.execute_batch(
        r"
        CREATE TABLE IF NOT EXISTS meta (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS records (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            datetime TEXT NOT NULL,
            content TEXT,
            channel TEXT,
            media_type TEXT DEFAULT 'text',
            media_path TEXT
        );
        CREATE INDEX IF NOT EXISTS idx_records_datetime ON records(datetime);
        CREATE INDEX IF NOT EXISTS idx_records_channel ON records(channel);
        CREATE INDEX IF NOT EXISTS idx_records_media_type ON records(media_type);

        CREATE TABLE IF NOT EXISTS reading_progress (
            id INTEGER PRIMARY KEY CHECK (id = 1),
            last_viewed_id INTEGER,
            last_viewed_datetime TEXT
        );

        CREATE TABLE IF NOT EXISTS search_history (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            keyword TEXT NOT NULL UNIQUE,
            searched_at TEXT
        );
        ",
    )?;
    Ok(())
}

fn migrate(conn: &Connection) -> Result<(), AppError> {
    let current_version = get_schema_version(conn);
    if current_version < SCHEMA_VERSION {
        tracing::info!(
            "Migrating database from version {} to {}",
            current_version,
            SCHEMA_VERSION
        );
        create_schema(conn)?;
        set_schema_version(conn, SCHEMA_VERSION)?;
    }
    Ok(())
}

impl Database {
    fn from_connection(conn: Connection, path: PathBuf) -> Self {
        let conn: SharedConnection = Arc::new(Mutex::new(conn));
        Self {
            records: record::RecordStore::new(conn.clone()),
            history: history::SearchHistoryStore::new(conn.clone()),
            progress: progress::ProgressStore::new(conn.clone()),
            conn,
            path,
        }
    }

    /// Open (or create) the database file and apply the schema.
    ///
    /// # Returns
    /// A fully initialized [`Database`].
    ///
    /// # Errors
    /// Returns an error when the file cannot be opened or the schema cannot
    /// be created.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, AppError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).ok();
        }
        let conn = open_connection(path)?;
        migrate(&conn)?;
        Ok(Self::from_connection(conn, path.to_path_buf()))
    }

    /// Open an in-memory database (for testing).
    ///
    /// # Errors
    /// Returns an error if the in-memory database cannot be initialized.
    pub fn open_memory() -> Result<Self, AppError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA temp_store = MEMORY;")?;
        migrate(&conn)?;
        Ok(Self::from_connection(conn, PathBuf::from(":memory:")))
    }

    /// Path of the backing database file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Swap the live database file for `incoming` and reopen.
    ///
    /// The live connection is released before touching files on disk, the
    /// current file is kept as a `.backup` sibling, and the backup is
    /// restored when the swap fails partway.
    ///
    /// # Errors
    /// Returns an error when file operations fail or the new file cannot be
    /// opened; the handle is left pointing at whichever file survived.
    pub fn replace_with_file(&self, incoming: &Path) -> Result<(), AppError> {
        let mut guard = lock_conn(&self.conn)?;
        // Drop the live handle so the file can be renamed on all platforms.
        *guard = Connection::open_in_memory()?;

        let backup = PathBuf::from(format!("{}.backup", self.path.display()));
        let swap = (|| -> Result<(), AppError> {
            if backup.exists() {
                std::fs::remove_file(&backup)?;
            }
            if self.path.exists() {
                std::fs::rename(&self.path, &backup)?;
            }
            std::fs::rename(incoming, &self.path)?;
            Ok(())
        })();

        if let Err(err) = swap {
            if !self.path.exists() && backup.exists() {
                if let Err(restore_err) = std::fs::rename(&backup, &self.path) {
                    tracing::error!("Failed to restore database backup: {}", restore_err);
                }
            }
            if self.path.exists() {
                *guard = open_connection(&self.path)?;
            }
            return Err(err);
        }

        let conn = open_connection(&self.path)?;
        migrate(&conn)?;
        *guard = conn;
        Ok(())
    }
}
