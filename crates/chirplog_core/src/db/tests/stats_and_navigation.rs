use super::{record, seed_mixed, test_db};

#[test]
fn year_month_tree_groups_and_sorts_descending() {
    let db = test_db();
    seed_mixed(&db);

    let tree = db.records.year_month_tree().expect("tree");
    let pairs: Vec<(String, String, u64)> = tree
        .into_iter()
        .map(|n| (n.year, n.month, n.count))
        .collect();
    assert_eq!(
        pairs,
        vec![
            ("2024".to_string(), "03".to_string(), 2),
            ("2024".to_string(), "02".to_string(), 1),
            ("2024".to_string(), "01".to_string(), 2),
            ("2023".to_string(), "06".to_string(), 1),
            ("2023".to_string(), "05".to_string(), 2),
        ]
    );
}

#[test]
fn channels_exclude_empty_and_sort_by_count() {
    let db = test_db();
    seed_mixed(&db);

    let channels = db.records.channels().expect("channels");
    assert_eq!(channels.len(), 2);
    assert_eq!(channels[0].channel, "web");
    assert_eq!(channels[0].count, 4);
    assert_eq!(channels[1].channel, "weibo");
    assert_eq!(channels[1].count, 2);
}

#[test]
fn summary_counts_totals_and_channels() {
    let db = test_db();
    seed_mixed(&db);

    let summary = db.records.summary_stats().expect("summary");
    assert_eq!(summary.total_count, 8);
    // Seeded datetimes are all in the past relative to any test run.
    assert_eq!(summary.weekly_count, 0);
    assert_eq!(summary.channels.len(), 2);
    assert_eq!(summary.channels[0].name, "web");
}

#[test]
fn combined_stats_aggregate_per_year_and_channel() {
    let db = test_db();
    seed_mixed(&db);

    let stats = db.records.combined_stats().expect("combined");
    // 2024: web, weibo, unchanneled; 2023: web, weibo, unchanneled → 6 rows.
    assert_eq!(stats.len(), 6);
    assert!(stats.iter().all(|s| s.month.is_empty()));
    assert_eq!(stats[0].year, "2024");

    let web_2024 = stats
        .iter()
        .find(|s| s.year == "2024" && s.channel == "web")
        .expect("2024/web row");
    assert_eq!(web_2024.count, 3);
    let expected_chars = "new year plans".len() + "valentine note".len() + "night walk".len();
    assert_eq!(web_2024.char_count, expected_chars as u64);
}

#[test]
fn total_count_reports_pages_for_page_size() {
    let db = test_db();
    seed_mixed(&db);

    let counts = db.records.total_count(6).expect("total count");
    assert_eq!(counts.count, 8);
    assert_eq!(counts.total_pages, 2);

    let empty = test_db().records.total_count(6).expect("empty count");
    assert_eq!(empty.count, 0);
    assert_eq!(empty.total_pages, 0);
}

#[test]
fn year_month_page_counts_filtered_pages() {
    let db = test_db();
    seed_mixed(&db);

    assert_eq!(db.records.year_month_page("2024", "01", 1).expect("page"), 2);
    assert_eq!(db.records.year_month_page("2024", "01", 6).expect("page"), 1);
    // No rows for the month still lands on page 1.
    assert_eq!(db.records.year_month_page("2019", "12", 6).expect("page"), 1);
}

#[test]
fn channel_page_counts_filtered_pages() {
    let db = test_db();
    seed_mixed(&db);

    assert_eq!(db.records.channel_page("web", 2).expect("page"), 2);
    assert_eq!(db.records.channel_page("", 1).expect("page"), 2);
    assert_eq!(db.records.channel_page("missing", 6).expect("page"), 1);
}

#[test]
fn record_page_locates_row_in_full_stream() {
    let db = test_db();
    let ids = seed_mixed(&db);

    // First seeded row is the oldest: position 8 → page 2 of 6, page 4 of 2.
    let oldest = ids[0];
    assert_eq!(db.records.record_page(oldest, 6).expect("page"), Some(2));
    assert_eq!(db.records.record_page(oldest, 2).expect("page"), Some(4));

    // Last seeded row is the newest: page 1.
    let newest = ids[7];
    assert_eq!(db.records.record_page(newest, 6).expect("page"), Some(1));

    assert_eq!(db.records.record_page(9999, 6).expect("page"), None);
}

#[test]
fn year_month_tree_skips_rows_with_blank_datetime() {
    let db = test_db();
    db.records
        .create(&record("2024-03-02 21:15:00", "ok", "web"))
        .expect("create");
    // Legacy imports can carry empty datetimes; the tree must skip them.
    db.records
        .create(&record("", "undated legacy row", ""))
        .expect("create blank datetime");

    assert_eq!(db.records.list_page(1, 10, None, None, None).expect("list").total, 2);
    let tree = db.records.year_month_tree().expect("tree");
    assert_eq!(tree.len(), 1);
    assert_eq!(tree[0].count, 1);
}
