use super::{seed_mixed, test_db};

#[test]
fn list_page_orders_newest_first_and_paginates() {
    let db = test_db();
    seed_mixed(&db);

    let first = db
        .records
        .list_page(1, 6, None, None, None)
        .expect("first page");
    assert_eq!(first.total, 8);
    assert_eq!(first.total_pages, 2);
    assert_eq!(first.current_page, 1);
    assert_eq!(first.records.len(), 6);
    assert_eq!(first.records[0].datetime, "2024-03-02 21:15:00");
    assert_eq!(first.records[5].datetime, "2023-06-10 11:00:00");
    assert!(first.records.iter().all(|r| r.page == Some(1)));

    let second = db
        .records
        .list_page(2, 6, None, None, None)
        .expect("second page");
    assert_eq!(second.records.len(), 2);
    assert_eq!(second.records[0].datetime, "2023-05-02 10:00:00");
    assert_eq!(second.records[1].datetime, "2023-05-01 09:00:00");
}

#[test]
fn list_page_clamps_page_below_one() {
    let db = test_db();
    seed_mixed(&db);
    let page = db
        .records
        .list_page(0, 6, None, None, None)
        .expect("clamped page");
    assert_eq!(page.current_page, 1);
    assert_eq!(page.records.len(), 6);
}

#[test]
fn list_page_beyond_end_is_empty_but_counts_remain() {
    let db = test_db();
    seed_mixed(&db);
    let page = db
        .records
        .list_page(5, 6, None, None, None)
        .expect("far page");
    assert!(page.records.is_empty());
    assert_eq!(page.total, 8);
    assert_eq!(page.total_pages, 2);
}

#[test]
fn channel_filter_distinguishes_exact_and_unchanneled() {
    let db = test_db();
    seed_mixed(&db);

    let web = db
        .records
        .list_page(1, 10, None, Some("web"), None)
        .expect("web filter");
    assert_eq!(web.total, 4);
    assert!(web
        .records
        .iter()
        .all(|r| r.channel.as_deref() == Some("web")));

    let unchanneled = db
        .records
        .list_page(1, 10, None, Some(""), None)
        .expect("empty-channel filter");
    assert_eq!(unchanneled.total, 2);
    assert!(unchanneled
        .records
        .iter()
        .all(|r| r.channel.as_deref().unwrap_or("").is_empty()));
}

#[test]
fn year_month_filter_uses_datetime_prefix() {
    let db = test_db();
    seed_mixed(&db);

    let january = db
        .records
        .list_page(1, 10, None, None, Some("2024-01"))
        .expect("year-month filter");
    assert_eq!(january.total, 2);
    assert!(january
        .records
        .iter()
        .all(|r| r.datetime.starts_with("2024-01")));
}

#[test]
fn search_filter_matches_content_and_channel() {
    let db = test_db();
    seed_mixed(&db);

    let by_content = db
        .records
        .list_page(1, 10, Some("dinner"), None, None)
        .expect("content search");
    assert_eq!(by_content.total, 1);
    assert_eq!(by_content.records[0].content.as_deref(), Some("late dinner"));

    let by_channel = db
        .records
        .list_page(1, 10, Some("weibo"), None, None)
        .expect("channel-term search");
    assert_eq!(by_channel.total, 2);
}

#[test]
fn combined_filters_intersect() {
    let db = test_db();
    seed_mixed(&db);

    let page = db
        .records
        .list_page(1, 10, Some("note"), Some("web"), Some("2024-02"))
        .expect("combined filters");
    assert_eq!(page.total, 1);
    assert_eq!(page.records[0].content.as_deref(), Some("valentine note"));
}

#[test]
fn search_page_annotates_home_page_in_full_stream() {
    let db = test_db();
    seed_mixed(&db);

    // "spring cleaning" is the oldest of 8 records: position 8 → page 2 of 6.
    let results = db
        .records
        .search_page("spring", 1, 6, None)
        .expect("search");
    assert_eq!(results.total, 1);
    assert_eq!(results.search_keyword.as_deref(), Some("spring"));
    assert_eq!(results.records[0].page, Some(2));

    // The newest record sits on page 1.
    let newest = db.records.search_page("night walk", 1, 6, None).expect("search");
    assert_eq!(newest.records[0].page, Some(1));
}

#[test]
fn search_page_honors_caller_page_size_for_positions() {
    let db = test_db();
    seed_mixed(&db);

    // With pages of 2, the oldest record (position 8) lives on page 4.
    let results = db
        .records
        .search_page("spring", 1, 2, None)
        .expect("search");
    assert_eq!(results.records[0].page, Some(4));
}

#[test]
fn search_page_supports_channel_filter() {
    let db = test_db();
    seed_mixed(&db);

    let unfiltered = db.records.search_page("a", 1, 10, None).expect("search");
    let web_only = db
        .records
        .search_page("a", 1, 10, Some("web"))
        .expect("filtered search");
    assert!(web_only.total < unfiltered.total);
    assert!(web_only
        .records
        .iter()
        .all(|r| r.channel.as_deref() == Some("web")));
}

#[test]
fn on_this_day_matches_month_day_across_years() {
    let db = test_db();
    seed_mixed(&db);
    db.records
        .create(&super::record("2022-03-02 10:00:00", "two years ago", ""))
        .expect("extra row");

    let results = db.records.on_this_day("03-02", 1, 6).expect("on this day");
    assert_eq!(results.total, 2);
    assert_eq!(results.search_keyword.as_deref(), Some("03-02"));
    assert_eq!(results.records[0].datetime, "2024-03-02 21:15:00");
    assert_eq!(results.records[1].datetime, "2022-03-02 10:00:00");
}
