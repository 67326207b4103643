//! Navigation trees, statistics, and page locator handlers.

use crate::error::HttpError;
use crate::AppState;
use axum::extract::{Path, Query, State};
use axum::Json;
use chirplog_core::models::record::{parse_param, PageSizeQuery};
use chirplog_core::models::stats::SummaryStats;
use serde_json::json;

/// Year/month navigation tree with per-month counts.
///
/// # Errors
/// Returns an error when the aggregate query fails.
pub async fn year_month_tree(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, HttpError> {
    let year_months = state.db.records.year_month_tree()?;
    Ok(Json(json!({ "yearMonths": year_months })))
}

/// Channels with record counts.
///
/// # Errors
/// Returns an error when the aggregate query fails.
pub async fn channels(State(state): State<AppState>) -> Result<Json<serde_json::Value>, HttpError> {
    let channels = state.db.records.channels()?;
    Ok(Json(json!({ "channels": channels })))
}

/// Dashboard summary statistics.
///
/// # Errors
/// Returns an error when the aggregate queries fail.
pub async fn summary(State(state): State<AppState>) -> Result<Json<SummaryStats>, HttpError> {
    Ok(Json(state.db.records.summary_stats()?))
}

/// Per `(year, channel)` aggregates.
///
/// # Errors
/// Returns an error when the aggregate query fails.
pub async fn combined(State(state): State<AppState>) -> Result<Json<serde_json::Value>, HttpError> {
    let stats = state.db.records.combined_stats()?;
    Ok(Json(json!({ "stats": stats })))
}

/// Jump target for one `(year, month)` in the filtered view.
///
/// # Errors
/// Returns an error when the locator query fails.
pub async fn year_month_page(
    State(state): State<AppState>,
    Path((year, month)): Path<(String, String)>,
    Query(query): Query<PageSizeQuery>,
) -> Result<Json<serde_json::Value>, HttpError> {
    let page_size = parse_param(query.page_size.as_deref(), state.config.page_size);
    let page = state.db.records.year_month_page(&year, &month, page_size)?;
    Ok(Json(json!({ "page": page })))
}

/// Jump target for one channel in the filtered view. An empty channel
/// segment is not routable, so unchanneled rows are addressed via
/// `/api/channel/%20/page`-style encodings handled by trimming.
///
/// # Errors
/// Returns an error when the locator query fails.
pub async fn channel_page(
    State(state): State<AppState>,
    Path(channel): Path<String>,
    Query(query): Query<PageSizeQuery>,
) -> Result<Json<serde_json::Value>, HttpError> {
    let page_size = parse_param(query.page_size.as_deref(), state.config.page_size);
    let page = state.db.records.channel_page(channel.trim(), page_size)?;
    Ok(Json(json!({ "page": page })))
}
