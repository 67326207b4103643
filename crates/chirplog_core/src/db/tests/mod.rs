//! Storage-layer tests against in-memory databases.

mod paging_and_filters;
mod stats_and_navigation;

use crate::db::Database;
use crate::models::record::NewRecord;

pub(crate) fn test_db() -> Database {
    Database::open_memory().expect("open in-memory db")
}

pub(crate) fn record(datetime: &str, content: &str, channel: &str) -> NewRecord {
    NewRecord {
        datetime: datetime.to_string(),
        content: content.to_string(),
        channel: channel.to_string(),
        media_type: "text".to_string(),
        media_path: String::new(),
    }
}

/// Seed eight records across two years/channels, newest `2024-03-02`.
pub(crate) fn seed_mixed(db: &Database) -> Vec<i64> {
    let rows = [
        ("2023-05-01 09:00:00", "spring cleaning", "web"),
        ("2023-05-02 10:00:00", "rain again", ""),
        ("2023-06-10 11:00:00", "june trip", "weibo"),
        ("2024-01-05 08:30:00", "new year plans", "web"),
        ("2024-01-20 19:00:00", "late dinner", "weibo"),
        ("2024-02-14 12:00:00", "valentine note", "web"),
        ("2024-03-01 07:45:00", "march begins", ""),
        ("2024-03-02 21:15:00", "night walk", "web"),
    ];
    rows.iter()
        .map(|(datetime, content, channel)| {
            db.records
                .create(&record(datetime, content, channel))
                .expect("seed record")
        })
        .collect()
}
