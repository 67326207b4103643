//! Reading progress storage helpers.

use crate::db::{lock_conn, SharedConnection};
use crate::error::AppError;
use crate::models::stats::ReadingProgress;
use rusqlite::{params, OptionalExtension};

/// Accessor for the single-row `reading_progress` table.
pub struct ProgressStore {
    conn: SharedConnection,
}

impl ProgressStore {
    pub(crate) fn new(conn: SharedConnection) -> Self {
        Self { conn }
    }

    /// Fetch the saved reading position, if any.
    ///
    /// # Errors
    /// Returns an error when the query fails.
    pub fn get(&self) -> Result<Option<ReadingProgress>, AppError> {
        let conn = lock_conn(&self.conn)?;
        conn.query_row(
            "SELECT last_viewed_id, last_viewed_datetime FROM reading_progress WHERE id = 1",
            [],
            |row| {
                Ok(ReadingProgress {
                    last_viewed_id: row.get(0)?,
                    last_viewed_datetime: row.get(1)?,
                })
            },
        )
        .optional()
        .map_err(Into::into)
    }

    /// Upsert the reading position (single row, id 1).
    ///
    /// # Errors
    /// Returns an error when the write fails.
    pub fn set(
        &self,
        last_viewed_id: Option<i64>,
        last_viewed_datetime: Option<&str>,
    ) -> Result<(), AppError> {
        let conn = lock_conn(&self.conn)?;
        conn.execute(
            "INSERT OR REPLACE INTO reading_progress (id, last_viewed_id, last_viewed_datetime)
             VALUES (1, ?1, ?2)",
            params![last_viewed_id, last_viewed_datetime],
        )?;
        Ok(())
    }
}
