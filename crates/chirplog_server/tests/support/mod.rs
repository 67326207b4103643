//! Shared integration-test server bootstrap helpers.

use axum_test::TestServer;
use chirplog_server::{AppState, Config, Database};
use serde_json::json;
use tempfile::TempDir;

pub(crate) fn test_config_for_dir(dir: &std::path::Path) -> Config {
    Config {
        data_dir: dir.join("data").to_string_lossy().to_string(),
        db_path: dir.join("data/records.db").to_string_lossy().to_string(),
        media_dir: dir.join("media").to_string_lossy().to_string(),
        port: 0, // Let OS assign port
        page_size: 6,
        max_upload_size: 10_000_000,
        cache_ttl_ms: 60_000,
        cache_capacity: 64,
        search_history_limit: 10,
        update_url: String::new(),
    }
}

pub(crate) fn test_server_for_config(config: Config) -> TestServer {
    config.ensure_directories().expect("create dirs");
    let db = Database::open(&config.db_path).expect("open db");
    let state = AppState::new(config, db);
    let app = chirplog_server::create_app(state, false);
    TestServer::new(app).expect("server")
}

pub(crate) fn setup_test_server() -> (TestServer, TempDir) {
    let temp_dir = TempDir::new().expect("temp dir");
    let config = test_config_for_dir(temp_dir.path());
    let server = test_server_for_config(config);
    (server, temp_dir)
}

/// Create a record through the API and return its id.
pub(crate) async fn post_record(
    server: &TestServer,
    datetime: &str,
    content: &str,
    channel: &str,
) -> i64 {
    let response = server
        .post("/api/records")
        .json(&json!({
            "datetime": datetime,
            "content": content,
            "channel": channel,
        }))
        .await;
    assert_eq!(
        response.status_code(),
        axum::http::StatusCode::OK,
        "create failed: {}",
        response.text()
    );
    let body: serde_json::Value = response.json();
    assert_eq!(body["success"], true);
    body["id"].as_i64().expect("created id")
}

/// Seed eight records across two years/channels, newest `2024-03-02`.
pub(crate) async fn seed_mixed(server: &TestServer) -> Vec<i64> {
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
    let mut ids = Vec::new();
    for (datetime, content, channel) in rows {
        ids.push(post_record(server, datetime, content, channel).await);
    }
    ids
}
