//! Record storage operations backed by rusqlite.

use crate::db::{lock_conn, SharedConnection};
use crate::error::AppError;
use crate::models::record::{total_pages, NewRecord, Record, RecordPage};
use crate::models::stats::{
    ChannelCount, CombinedStat, NamedCount, SummaryStats, TotalCount, YearMonthCount,
};
use rusqlite::{params, params_from_iter, Connection, OptionalExtension};

const RECORD_COLUMNS: &str = "id, datetime, content, channel, media_type, media_path";

/// Accessor for the `records` table.
pub struct RecordStore {
    conn: SharedConnection,
}

fn record_from_row(row: &rusqlite::Row<'_>, page: Option<u64>) -> rusqlite::Result<Record> {
    Ok(Record {
        id: row.get(0)?,
        datetime: row.get(1)?,
        content: row.get(2)?,
        channel: row.get(3)?,
        media_type: row.get(4)?,
        media_path: row.get(5)?,
        page,
    })
}

/// Filter clause builder shared by the listing and count queries.
///
/// `channel` distinguishes three cases: absent (no filter), empty string
/// (rows without a channel), and a concrete name (exact match).
fn push_filters(
    sql: &mut String,
    params: &mut Vec<String>,
    search: Option<&str>,
    channel: Option<&str>,
    year_month: Option<&str>,
) {
    if let Some(term) = search.filter(|term| !term.is_empty()) {
        sql.push_str(" AND (content LIKE ? OR channel LIKE ?)");
        let pattern = format!("%{}%", term);
        params.push(pattern.clone());
        params.push(pattern);
    }
    match channel {
        Some("") => sql.push_str(" AND (channel IS NULL OR channel = '')"),
        Some(name) => {
            sql.push_str(" AND channel = ?");
            params.push(name.to_string());
        }
        None => {}
    }
    if let Some(year_month) = year_month.filter(|value| !value.is_empty()) {
        sql.push_str(" AND datetime LIKE ?");
        params.push(format!("{}%", year_month));
    }
}

fn count_where(
    conn: &Connection,
    where_sql: &str,
    params: &[String],
) -> Result<u64, AppError> {
    let sql = format!("SELECT COUNT(*) FROM records WHERE 1=1{}", where_sql);
    let count: i64 = conn.query_row(&sql, params_from_iter(params.iter()), |row| row.get(0))?;
    Ok(count as u64)
}

impl RecordStore {
    pub(crate) fn new(conn: SharedConnection) -> Self {
        Self { conn }
    }

    /// Insert a record and return its id.
    ///
    /// # Errors
    /// Returns an error when the insert fails.
    pub fn create(&self, record: &NewRecord) -> Result<i64, AppError> {
        let conn = lock_conn(&self.conn)?;
        conn.execute(
            "INSERT INTO records (datetime, content, channel, media_type, media_path)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                record.datetime,
                record.content,
                record.channel,
                record.media_type,
                record.media_path
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// Fetch a record by id.
    ///
    /// # Returns
    /// `Ok(Some(record))` when found, `Ok(None)` when missing.
    pub fn get(&self, id: i64) -> Result<Option<Record>, AppError> {
        let conn = lock_conn(&self.conn)?;
        let sql = format!("SELECT {} FROM records WHERE id = ?1", RECORD_COLUMNS);
        conn.query_row(&sql, params![id], |row| record_from_row(row, None))
            .optional()
            .map_err(Into::into)
    }

    /// Replace all fields of a record.
    ///
    /// # Returns
    /// `true` when a row was updated, `false` when the id is unknown.
    pub fn update(&self, id: i64, record: &NewRecord) -> Result<bool, AppError> {
        let conn = lock_conn(&self.conn)?;
        let changed = conn.execute(
            "UPDATE records
             SET datetime = ?1, content = ?2, channel = ?3, media_type = ?4, media_path = ?5
             WHERE id = ?6",
            params![
                record.datetime,
                record.content,
                record.channel,
                record.media_type,
                record.media_path,
                id
            ],
        )?;
        Ok(changed > 0)
    }

    /// Delete a record by id.
    ///
    /// # Returns
    /// `true` when a row was deleted.
    pub fn delete(&self, id: i64) -> Result<bool, AppError> {
        let conn = lock_conn(&self.conn)?;
        let changed = conn.execute("DELETE FROM records WHERE id = ?1", params![id])?;
        Ok(changed > 0)
    }

    /// List one page of records, newest first, with optional filters.
    ///
    /// # Arguments
    /// - `page`: 1-based page number (clamped to 1).
    /// - `page_size`: Rows per page.
    /// - `search`: Substring filter over content/channel.
    /// - `channel`: Channel filter; `Some("")` selects unchanneled rows.
    /// - `year_month`: `YYYY-MM` datetime prefix filter.
    ///
    /// # Returns
    /// The page plus total row/page counts for the filtered view.
    ///
    /// # Errors
    /// Returns an error when the query fails.
    pub fn list_page(
        &self,
        page: u64,
        page_size: u64,
        search: Option<&str>,
        channel: Option<&str>,
        year_month: Option<&str>,
    ) -> Result<RecordPage, AppError> {
        let page = page.max(1);
        let page_size = page_size.max(1);

        let mut where_sql = String::new();
        let mut filter_params: Vec<String> = Vec::new();
        push_filters(&mut where_sql, &mut filter_params, search, channel, year_month);

        let conn = lock_conn(&self.conn)?;
        let total = count_where(&conn, &where_sql, &filter_params)?;

        let offset = (page - 1) * page_size;
        let sql = format!(
            "SELECT {} FROM records WHERE 1=1{} ORDER BY datetime DESC LIMIT {} OFFSET {}",
            RECORD_COLUMNS, where_sql, page_size, offset
        );
        let mut stmt = conn.prepare(&sql)?;
        let records = stmt
            .query_map(params_from_iter(filter_params.iter()), |row| {
                record_from_row(row, Some(page))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(RecordPage {
            records,
            current_page: page,
            total_pages: total_pages(total, page_size),
            total,
            search_keyword: None,
        })
    }

    /// Search records by keyword over content/channel.
    ///
    /// Each hit carries the page it occupies in the full newest-first stream
    /// so the UI can jump from a search result to its home page.
    ///
    /// # Errors
    /// Returns an error when the query fails.
    pub fn search_page(
        &self,
        keyword: &str,
        page: u64,
        page_size: u64,
        channel: Option<&str>,
    ) -> Result<RecordPage, AppError> {
        let page = page.max(1);
        let page_size = page_size.max(1);

        let mut where_sql = String::new();
        let mut filter_params: Vec<String> = Vec::new();
        push_filters(&mut where_sql, &mut filter_params, Some(keyword), channel, None);

        let conn = lock_conn(&self.conn)?;
        let total = count_where(&conn, &where_sql, &filter_params)?;

        let offset = (page - 1) * page_size;
        let sql = format!(
            "SELECT s.id, s.datetime, s.content, s.channel, s.media_type, s.media_path,
                    (SELECT COUNT(*) + 1 FROM records WHERE datetime > s.datetime) AS position
             FROM records s WHERE 1=1{}
             ORDER BY s.datetime DESC LIMIT {} OFFSET {}",
            where_sql, page_size, offset
        );
        let mut stmt = conn.prepare(&sql)?;
        let records = stmt
            .query_map(params_from_iter(filter_params.iter()), |row| {
                let position: i64 = row.get(6)?;
                let home_page = total_pages(position.max(1) as u64, page_size);
                record_from_row(row, Some(home_page))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(RecordPage {
            records,
            current_page: page,
            total_pages: total_pages(total, page_size),
            total,
            search_keyword: Some(keyword.to_string()),
        })
    }

    /// List records whose datetime falls on `month_day` (`MM-DD`) in any year.
    ///
    /// # Errors
    /// Returns an error when the query fails.
    pub fn on_this_day(
        &self,
        month_day: &str,
        page: u64,
        page_size: u64,
    ) -> Result<RecordPage, AppError> {
        let page = page.max(1);
        let page_size = page_size.max(1);

        let conn = lock_conn(&self.conn)?;
        let total: i64 = conn.query_row(
            "SELECT COUNT(*) FROM records WHERE strftime('%m-%d', datetime) = ?1",
            params![month_day],
            |row| row.get(0),
        )?;
        let total = total as u64;

        let offset = (page - 1) * page_size;
        let sql = format!(
            "SELECT {} FROM records WHERE strftime('%m-%d', datetime) = ?1
             ORDER BY datetime DESC LIMIT {} OFFSET {}",
            RECORD_COLUMNS, page_size, offset
        );
        let mut stmt = conn.prepare(&sql)?;
        let records = stmt
            .query_map(params![month_day], |row| record_from_row(row, Some(page)))?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(RecordPage {
            records,
            current_page: page,
            total_pages: total_pages(total, page_size),
            total,
            search_keyword: Some(month_day.to_string()),
        })
    }

    /// Distinct `(year, month)` groups with counts, newest first.
    ///
    /// # Errors
    /// Returns an error when the query fails.
    pub fn year_month_tree(&self) -> Result<Vec<YearMonthCount>, AppError> {
        let conn = lock_conn(&self.conn)?;
        let mut stmt = conn.prepare(
            "SELECT strftime('%Y', datetime) AS year,
                    strftime('%m', datetime) AS month,
                    COUNT(*) AS count
             FROM records
             WHERE datetime IS NOT NULL AND datetime != ''
             GROUP BY strftime('%Y', datetime), strftime('%m', datetime)
             ORDER BY year DESC, month DESC",
        )?;
        let rows = stmt
            .query_map([], |row| {
                // Rows with unparseable datetimes yield NULL year/month.
                Ok(YearMonthCount {
                    year: row.get::<_, Option<String>>(0)?.unwrap_or_default(),
                    month: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
                    count: row.get::<_, i64>(2)? as u64,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows.into_iter().filter(|n| !n.year.is_empty()).collect())
    }

    /// Channels with record counts, most used first. NULL/empty excluded.
    ///
    /// # Errors
    /// Returns an error when the query fails.
    pub fn channels(&self) -> Result<Vec<ChannelCount>, AppError> {
        let conn = lock_conn(&self.conn)?;
        let mut stmt = conn.prepare(
            "SELECT channel, COUNT(*) AS count
             FROM records
             WHERE channel IS NOT NULL AND channel != ''
             GROUP BY channel
             ORDER BY count DESC",
        )?;
        let rows = stmt
            .query_map([], |row| {
                Ok(ChannelCount {
                    channel: row.get(0)?,
                    count: row.get::<_, i64>(1)? as u64,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Dashboard summary: totals plus per-channel counts.
    ///
    /// # Errors
    /// Returns an error when any query fails.
    pub fn summary_stats(&self) -> Result<SummaryStats, AppError> {
        let conn = lock_conn(&self.conn)?;
        let total_count: i64 =
            conn.query_row("SELECT COUNT(*) FROM records", [], |row| row.get(0))?;
        let weekly_count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM records WHERE datetime >= date('now', '-7 days')",
            [],
            |row| row.get(0),
        )?;
        let mut stmt = conn.prepare(
            "SELECT channel, COUNT(*) AS count
             FROM records
             WHERE channel IS NOT NULL AND channel != ''
             GROUP BY channel
             ORDER BY count DESC",
        )?;
        let channels = stmt
            .query_map([], |row| {
                Ok(NamedCount {
                    name: row.get(0)?,
                    count: row.get::<_, i64>(1)? as u64,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(SummaryStats {
            total_count: total_count as u64,
            weekly_count: weekly_count as u64,
            channels,
        })
    }

    /// Per `(year, channel)` aggregates with summed content length.
    ///
    /// # Errors
    /// Returns an error when the query fails.
    pub fn combined_stats(&self) -> Result<Vec<CombinedStat>, AppError> {
        let conn = lock_conn(&self.conn)?;
        let mut stmt = conn.prepare(
            "SELECT strftime('%Y', datetime) AS year,
                    channel,
                    COUNT(*) AS count,
                    SUM(LENGTH(content)) AS char_count
             FROM records
             GROUP BY strftime('%Y', datetime), channel
             ORDER BY year DESC",
        )?;
        let rows = stmt
            .query_map([], |row| {
                Ok(CombinedStat {
                    year: row.get::<_, Option<String>>(0)?.unwrap_or_default(),
                    month: String::new(),
                    channel: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
                    count: row.get::<_, i64>(2)? as u64,
                    char_count: row.get::<_, Option<i64>>(3)?.unwrap_or(0) as u64,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Total record count and the page count it implies.
    ///
    /// # Errors
    /// Returns an error when the query fails.
    pub fn total_count(&self, page_size: u64) -> Result<TotalCount, AppError> {
        let conn = lock_conn(&self.conn)?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM records", [], |row| row.get(0))?;
        let count = count as u64;
        Ok(TotalCount {
            count,
            total_pages: total_pages(count, page_size),
        })
    }

    /// Number of pages in the view filtered to one `(year, month)`.
    ///
    /// Used as a jump target (the last page of the filtered view holds the
    /// oldest rows). Clamped to at least 1 so an empty month still lands
    /// somewhere.
    ///
    /// # Errors
    /// Returns an error when the query fails.
    pub fn year_month_page(
        &self,
        year: &str,
        month: &str,
        page_size: u64,
    ) -> Result<u64, AppError> {
        let conn = lock_conn(&self.conn)?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM records WHERE datetime LIKE ?1",
            params![format!("{}-{}%", year, month)],
            |row| row.get(0),
        )?;
        Ok(total_pages(count as u64, page_size).max(1))
    }

    /// Number of pages in the view filtered to one channel.
    ///
    /// An empty channel selects rows without a channel. Clamped to at
    /// least 1.
    ///
    /// # Errors
    /// Returns an error when the query fails.
    pub fn channel_page(&self, channel: &str, page_size: u64) -> Result<u64, AppError> {
        let conn = lock_conn(&self.conn)?;
        let count: i64 = if channel.is_empty() {
            conn.query_row(
                "SELECT COUNT(*) FROM records WHERE channel IS NULL OR channel = ''",
                [],
                |row| row.get(0),
            )?
        } else {
            conn.query_row(
                "SELECT COUNT(*) FROM records WHERE channel = ?1",
                params![channel],
                |row| row.get(0),
            )?
        };
        Ok(total_pages(count as u64, page_size).max(1))
    }

    /// Page of the unfiltered newest-first stream containing `record_id`.
    ///
    /// # Returns
    /// `Ok(None)` when the record does not exist.
    ///
    /// # Errors
    /// Returns an error when the query fails.
    pub fn record_page(&self, record_id: i64, page_size: u64) -> Result<Option<u64>, AppError> {
        let conn = lock_conn(&self.conn)?;
        let datetime: Option<String> = conn
            .query_row(
                "SELECT datetime FROM records WHERE id = ?1",
                params![record_id],
                |row| row.get(0),
            )
            .optional()?;
        let Some(datetime) = datetime else {
            return Ok(None);
        };

        let position: i64 = conn.query_row(
            "SELECT COUNT(*) + 1 FROM records WHERE datetime > ?1",
            params![datetime],
            |row| row.get(0),
        )?;
        Ok(Some(total_pages(position.max(1) as u64, page_size)))
    }
}
