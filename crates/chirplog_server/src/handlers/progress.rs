//! Reading progress handlers.

use crate::error::HttpError;
use crate::AppState;
use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use serde_json::json;

/// Request payload for saving the reading position.
#[derive(Debug, Deserialize)]
pub struct ProgressPayload {
    #[serde(rename = "lastViewedId")]
    pub last_viewed_id: Option<i64>,
    #[serde(rename = "lastViewedDatetime")]
    pub last_viewed_datetime: Option<String>,
}

/// Saved reading position, or null when never set.
///
/// # Errors
/// Returns an error when the query fails.
pub async fn get_progress(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, HttpError> {
    let progress = state.db.progress.get()?;
    Ok(Json(json!({ "progress": progress })))
}

/// Save the reading position.
///
/// # Errors
/// Returns an error when the write fails.
pub async fn set_progress(
    State(state): State<AppState>,
    Json(payload): Json<ProgressPayload>,
) -> Result<Json<serde_json::Value>, HttpError> {
    state.db.progress.set(
        payload.last_viewed_id,
        payload.last_viewed_datetime.as_deref(),
    )?;
    Ok(Json(json!({ "success": true })))
}
