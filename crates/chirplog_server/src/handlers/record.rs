//! Record listing and CRUD handlers.

use crate::error::HttpError;
use crate::AppState;
use axum::extract::{Path, Query, State};
use axum::Json;
use chirplog_core::models::record::{
    parse_param, ListQuery, PageSizeQuery, Record, RecordPage, RecordPayload,
};
use chirplog_core::models::stats::TotalCount;
use chirplog_core::{AppError, PageKey};
use serde_json::json;

/// List one page of records with optional filters, served through the page
/// cache.
///
/// # Arguments
/// - `state`: Application state.
/// - `query`: `page`, `pageSize`, `search`, `channel`, `yearMonth`.
///
/// # Returns
/// The page of records plus pagination counts as JSON.
///
/// # Errors
/// Returns an error if the listing query fails.
pub async fn list_records(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<RecordPage>, HttpError> {
    let page = parse_param(query.page.as_deref(), 1u64);
    let page_size = parse_param(query.page_size.as_deref(), state.config.page_size);
    let search = query.search.unwrap_or_default();
    let year_month = query.year_month.unwrap_or_default();
    let channel = query.channel;

    let key = PageKey {
        page,
        page_size,
        search: search.clone(),
        channel: channel.clone(),
        year_month: year_month.clone(),
    };
    if let Some(cached) = state.cache.get(&key) {
        return Ok(Json(cached));
    }

    let result = state.db.records.list_page(
        page,
        page_size,
        Some(search.as_str()),
        channel.as_deref(),
        Some(year_month.as_str()),
    )?;
    state.cache.insert(key, result.clone());
    Ok(Json(result))
}

/// Fetch a single record by id.
///
/// # Errors
/// Returns 404 when the record does not exist.
pub async fn get_record(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Record>, HttpError> {
    state
        .db
        .records
        .get(id)?
        .map(Json)
        .ok_or_else(|| AppError::NotFound.into())
}

/// Create a new record.
///
/// # Arguments
/// - `state`: Application state.
/// - `payload`: Record body; `datetime` and `content` are required.
///
/// # Returns
/// `{success: true, id}` as JSON.
///
/// # Errors
/// Returns 400 when validation fails.
pub async fn create_record(
    State(state): State<AppState>,
    Json(payload): Json<RecordPayload>,
) -> Result<Json<serde_json::Value>, HttpError> {
    let record = payload.validated()?;
    let id = state.db.records.create(&record)?;
    state.cache.invalidate_all();
    Ok(Json(json!({ "success": true, "id": id })))
}

/// Replace all fields of an existing record.
///
/// # Errors
/// Returns 400 when validation fails, 404 for unknown ids.
pub async fn update_record(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<RecordPayload>,
) -> Result<Json<serde_json::Value>, HttpError> {
    let record = payload.validated()?;
    if !state.db.records.update(id, &record)? {
        return Err(AppError::NotFound.into());
    }
    state.cache.invalidate_all();
    Ok(Json(json!({ "success": true })))
}

/// Delete a record by id.
///
/// # Errors
/// Returns 404 for unknown ids.
pub async fn delete_record(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>, HttpError> {
    if !state.db.records.delete(id)? {
        return Err(AppError::NotFound.into());
    }
    state.cache.invalidate_all();
    Ok(Json(json!({ "success": true })))
}

/// Total record count and derived page count.
///
/// # Errors
/// Returns an error when the count query fails.
pub async fn total_count(
    State(state): State<AppState>,
    Query(query): Query<PageSizeQuery>,
) -> Result<Json<TotalCount>, HttpError> {
    let page_size = parse_param(query.page_size.as_deref(), state.config.page_size);
    Ok(Json(state.db.records.total_count(page_size)?))
}

/// Bootstrap payload the client needs on startup, in one round trip.
///
/// # Errors
/// Returns an error when the count query fails.
pub async fn init_data(
    State(state): State<AppState>,
    Query(query): Query<PageSizeQuery>,
) -> Result<Json<serde_json::Value>, HttpError> {
    let page_size = parse_param(query.page_size.as_deref(), state.config.page_size);
    let counts = state.db.records.total_count(page_size)?;
    Ok(Json(json!({
        "totalRecords": counts.count,
        "totalPages": counts.total_pages,
        "latestPage": 1,
    })))
}

/// Page holding the newest record. Records are listed newest first, so this
/// is always page 1.
pub async fn latest_page() -> Json<serde_json::Value> {
    Json(json!({ "page": 1 }))
}

/// Page of the unfiltered stream containing the given record.
///
/// # Returns
/// `{page}` as JSON; `page` is null for unknown ids.
///
/// # Errors
/// Returns an error when the locator query fails.
pub async fn record_page(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(query): Query<PageSizeQuery>,
) -> Result<Json<serde_json::Value>, HttpError> {
    let page_size = parse_param(query.page_size.as_deref(), state.config.page_size);
    let page = state.db.records.record_page(id, page_size)?;
    Ok(Json(json!({ "page": page })))
}
