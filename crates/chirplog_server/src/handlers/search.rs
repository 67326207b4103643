//! Keyword search and search history handlers.

use crate::error::HttpError;
use crate::AppState;
use axum::extract::{Path, Query, State};
use axum::response::{IntoResponse, Response};
use axum::Json;
use chirplog_core::models::record::{parse_param, RecordPage, SearchQuery};
use chirplog_core::AppError;
use serde::Deserialize;
use serde_json::json;

fn is_month_day(value: &str) -> bool {
    let bytes = value.as_bytes();
    bytes.len() == 5
        && bytes[0].is_ascii_digit()
        && bytes[1].is_ascii_digit()
        && bytes[2] == b'-'
        && bytes[3].is_ascii_digit()
        && bytes[4].is_ascii_digit()
}

/// Search records by keyword; an empty keyword returns the search history
/// instead, letting the search box show recent terms with a single request.
///
/// Non-empty keywords are recorded into the history.
///
/// # Arguments
/// - `state`: Application state.
/// - `query`: `keyword`, `page`, `pageSize`, optional `channel` filter.
///
/// # Returns
/// Matching records (with their home page in the full stream) or the
/// history, as JSON.
///
/// # Errors
/// Returns an error if the search query fails.
pub async fn search(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Response, HttpError> {
    let keyword = query.keyword.as_deref().map(str::trim).unwrap_or_default();
    if keyword.is_empty() {
        let history = state.db.history.list(state.config.search_history_limit)?;
        return Ok(Json(json!({ "history": history })).into_response());
    }

    if let Err(err) = state.db.history.add(keyword) {
        tracing::warn!("Failed to record search history: {}", err);
    }

    let page = parse_param(query.page.as_deref(), 1u64);
    let page_size = parse_param(query.page_size.as_deref(), state.config.page_size);
    let results = state
        .db
        .records
        .search_page(keyword, page, page_size, query.channel.as_deref())?;
    Ok(Json(results).into_response())
}

/// Records from this calendar day across all years.
///
/// # Arguments
/// - `state`: Application state.
/// - `query`: `keyword` must be `MM-DD`; `page`, `pageSize`.
///
/// # Errors
/// Returns 400 when the keyword is not of the form `MM-DD`.
pub async fn on_this_day(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<RecordPage>, HttpError> {
    let keyword = query.keyword.as_deref().map(str::trim).unwrap_or_default();
    if !is_month_day(keyword) {
        return Err(
            AppError::BadRequest(format!("invalid day '{}', expected MM-DD", keyword)).into(),
        );
    }

    let page = parse_param(query.page.as_deref(), 1u64);
    let page_size = parse_param(query.page_size.as_deref(), state.config.page_size);
    Ok(Json(state.db.records.on_this_day(keyword, page, page_size)?))
}

/// Most recent search keywords.
///
/// # Errors
/// Returns an error when the history query fails.
pub async fn list_history(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, HttpError> {
    let history = state.db.history.list(state.config.search_history_limit)?;
    Ok(Json(json!({ "history": history })))
}

/// Request payload for adding a search history entry.
#[derive(Debug, Deserialize)]
pub struct HistoryPayload {
    pub keyword: Option<String>,
}

/// Remember a search keyword.
///
/// # Errors
/// Returns 400 when the keyword is missing or empty.
pub async fn add_history(
    State(state): State<AppState>,
    Json(payload): Json<HistoryPayload>,
) -> Result<Json<serde_json::Value>, HttpError> {
    let keyword = payload
        .keyword
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .ok_or_else(|| AppError::BadRequest("keyword is required".to_string()))?;
    state.db.history.add(keyword)?;
    Ok(Json(json!({ "success": true })))
}

/// Forget a search keyword. Deleting an unknown keyword is a no-op.
///
/// # Errors
/// Returns an error when the delete fails.
pub async fn delete_history(
    State(state): State<AppState>,
    Path(keyword): Path<String>,
) -> Result<Json<serde_json::Value>, HttpError> {
    state.db.history.remove(&keyword)?;
    Ok(Json(json!({ "success": true })))
}

#[cfg(test)]
mod tests {
    use super::is_month_day;

    #[test]
    fn month_day_format_check() {
        assert!(is_month_day("03-02"));
        assert!(is_month_day("12-31"));
        for bad in ["3-2", "2024-03", "03/02", "03-2", "", "aa-bb"] {
            assert!(!is_month_day(bad), "value: {}", bad);
        }
    }
}
