//! Record data models and the wire shapes of listing/search responses.

use crate::error::AppError;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Storage format of record datetimes (local time, text-sortable).
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A single journal record as stored and returned by the API.
///
/// `page` is only present on listing/search responses, where it carries the
/// page the record occupies in the current view (listings) or in the full
/// newest-first stream (search hits).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Record {
    pub id: i64,
    pub datetime: String,
    pub content: Option<String>,
    pub channel: Option<String>,
    pub media_type: Option<String>,
    pub media_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<u64>,
}

/// One page of records plus pagination bookkeeping.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordPage {
    pub records: Vec<Record>,
    #[serde(rename = "currentPage")]
    pub current_page: u64,
    #[serde(rename = "totalPages")]
    pub total_pages: u64,
    pub total: u64,
    #[serde(
        rename = "searchKeyword",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub search_keyword: Option<String>,
}

/// Request payload for creating or replacing a record.
#[derive(Debug, Clone, Deserialize)]
pub struct RecordPayload {
    pub datetime: Option<String>,
    pub content: Option<String>,
    #[serde(default)]
    pub channel: Option<String>,
    #[serde(default)]
    pub media_type: Option<String>,
    #[serde(default)]
    pub media_path: Option<String>,
}

/// A validated record body ready for insert/update.
#[derive(Debug, Clone)]
pub struct NewRecord {
    pub datetime: String,
    pub content: String,
    pub channel: String,
    pub media_type: String,
    pub media_path: String,
}

impl RecordPayload {
    /// Validate the payload into a [`NewRecord`].
    ///
    /// # Errors
    /// Returns `BadRequest` when `datetime` or `content` is missing/empty or
    /// when the datetime is not in `YYYY-MM-DD HH:MM:SS` form.
    pub fn validated(&self) -> Result<NewRecord, AppError> {
        let datetime = self
            .datetime
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .ok_or_else(|| {
                AppError::BadRequest("missing required field: datetime".to_string())
            })?;
        let content = self
            .content
            .as_deref()
            .filter(|value| !value.trim().is_empty())
            .ok_or_else(|| AppError::BadRequest("missing required field: content".to_string()))?;
        validate_datetime(datetime)?;

        Ok(NewRecord {
            datetime: datetime.to_string(),
            content: content.to_string(),
            channel: self.channel.clone().unwrap_or_default(),
            media_type: self
                .media_type
                .clone()
                .filter(|value| !value.is_empty())
                .unwrap_or_else(|| "text".to_string()),
            media_path: self.media_path.clone().unwrap_or_default(),
        })
    }
}

/// Check a datetime string against [`DATETIME_FORMAT`].
///
/// # Errors
/// Returns `BadRequest` on malformed input.
pub fn validate_datetime(value: &str) -> Result<(), AppError> {
    NaiveDateTime::parse_from_str(value, DATETIME_FORMAT)
        .map(|_| ())
        .map_err(|_| {
            AppError::BadRequest(format!(
                "invalid datetime '{}', expected YYYY-MM-DD HH:MM:SS",
                value
            ))
        })
}

/// Query parameters for listing records.
///
/// Numeric params arrive as raw strings so that the literal `undefined` some
/// clients send falls back to defaults instead of failing deserialization.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub page: Option<String>,
    #[serde(rename = "pageSize")]
    pub page_size: Option<String>,
    pub search: Option<String>,
    pub channel: Option<String>,
    #[serde(rename = "yearMonth")]
    pub year_month: Option<String>,
}

/// Query parameters for keyword search.
#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    pub keyword: Option<String>,
    pub page: Option<String>,
    #[serde(rename = "pageSize")]
    pub page_size: Option<String>,
    pub channel: Option<String>,
}

/// Query parameter carrying only a page size.
#[derive(Debug, Default, Deserialize)]
pub struct PageSizeQuery {
    #[serde(rename = "pageSize")]
    pub page_size: Option<String>,
}

/// Leniently parse a numeric query parameter.
///
/// Empty strings and unparseable values (including the literal `undefined`)
/// fall back to `default`.
pub fn parse_param<T: std::str::FromStr>(value: Option<&str>, default: T) -> T {
    value
        .map(str::trim)
        .filter(|raw| !raw.is_empty())
        .and_then(|raw| raw.parse().ok())
        .unwrap_or(default)
}

/// Compute the number of pages needed for `total` rows.
pub fn total_pages(total: u64, page_size: u64) -> u64 {
    let page_size = page_size.max(1);
    total.div_ceil(page_size)
}
