//! Search history storage helpers.

use crate::db::{lock_conn, SharedConnection};
use crate::error::AppError;
use crate::models::stats::HistoryEntry;
use rusqlite::params;

/// Accessor for the `search_history` table.
pub struct SearchHistoryStore {
    conn: SharedConnection,
}

impl SearchHistoryStore {
    pub(crate) fn new(conn: SharedConnection) -> Self {
        Self { conn }
    }

    /// Remember a keyword; re-searching refreshes its recency.
    ///
    /// # Errors
    /// Returns an error when the upsert fails.
    pub fn add(&self, keyword: &str) -> Result<(), AppError> {
        let keyword = keyword.trim();
        if keyword.is_empty() {
            return Ok(());
        }
        let conn = lock_conn(&self.conn)?;
        conn.execute(
            "INSERT INTO search_history (keyword, searched_at)
             VALUES (?1, datetime('now', 'localtime'))
             ON CONFLICT(keyword) DO UPDATE SET searched_at = datetime('now', 'localtime')",
            params![keyword],
        )?;
        Ok(())
    }

    /// Most recent keywords, newest first.
    ///
    /// # Errors
    /// Returns an error when the query fails.
    pub fn list(&self, limit: u64) -> Result<Vec<HistoryEntry>, AppError> {
        let conn = lock_conn(&self.conn)?;
        let mut stmt = conn.prepare(
            "SELECT keyword FROM search_history ORDER BY searched_at DESC LIMIT ?1",
        )?;
        let rows = stmt
            .query_map(params![limit as i64], |row| {
                Ok(HistoryEntry {
                    keyword: row.get(0)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows.into_iter().filter(|e| !e.keyword.is_empty()).collect())
    }

    /// Forget a keyword.
    ///
    /// # Returns
    /// `true` when a row was deleted.
    pub fn remove(&self, keyword: &str) -> Result<bool, AppError> {
        let conn = lock_conn(&self.conn)?;
        let changed = conn.execute(
            "DELETE FROM search_history WHERE keyword = ?1",
            params![keyword],
        )?;
        Ok(changed > 0)
    }
}
