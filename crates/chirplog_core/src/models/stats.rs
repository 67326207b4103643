//! Wire shapes for navigation trees, statistics, history, and progress.

use serde::{Deserialize, Serialize};

/// One `(year, month)` group in the navigation tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct YearMonthCount {
    pub year: String,
    pub month: String,
    pub count: u64,
}

/// One channel with its record count.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelCount {
    pub channel: String,
    pub count: u64,
}

/// A named count used inside the summary response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NamedCount {
    pub name: String,
    pub count: u64,
}

/// Totals shown on the dashboard summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryStats {
    #[serde(rename = "totalCount")]
    pub total_count: u64,
    #[serde(rename = "weeklyCount")]
    pub weekly_count: u64,
    pub channels: Vec<NamedCount>,
}

/// One `(year, channel)` aggregate row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CombinedStat {
    pub year: String,
    pub month: String,
    pub channel: String,
    pub count: u64,
    pub char_count: u64,
}

/// Persisted reading position.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadingProgress {
    pub last_viewed_id: Option<i64>,
    pub last_viewed_datetime: Option<String>,
}

/// One remembered search keyword.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub keyword: String,
}

/// Total record count plus derived page count.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TotalCount {
    pub count: u64,
    #[serde(rename = "totalPages")]
    pub total_pages: u64,
}
