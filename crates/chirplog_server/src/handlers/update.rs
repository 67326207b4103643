//! Online update handlers.
//!
//! Download endpoints report failures inside the JSON body (`success`
//! flags) instead of HTTP errors; the settings panel polls these and renders
//! the outcome either way.

use crate::error::HttpError;
use crate::update::UpdateCheck;
use crate::AppState;
use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use serde_json::json;

/// Check the update source for a newer data version.
pub async fn check(State(state): State<AppState>) -> Json<UpdateCheck> {
    Json(state.updater.check().await)
}

/// Download and swap in the remote database snapshot.
pub async fn update_database(State(state): State<AppState>) -> Json<serde_json::Value> {
    match state
        .updater
        .download_database(&state.db, &state.cache)
        .await
    {
        Ok(()) => Json(json!({ "success": true })),
        Err(err) => Json(json!({ "success": false, "error": err.to_string() })),
    }
}

/// Additively sync remote media files.
pub async fn update_media(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(
        serde_json::to_value(state.updater.download_media().await)
            .unwrap_or_else(|_| json!({ "success": false })),
    )
}

/// Full update: database then media.
pub async fn update_all(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(state.updater.update_all(&state.db, &state.cache).await)
}

/// Current update source configuration.
pub async fn get_config(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(json!({ "update_url": state.updater.update_url() }))
}

/// Request payload for changing the update source.
#[derive(Debug, Deserialize)]
pub struct UpdateConfigPayload {
    #[serde(default)]
    pub update_url: String,
}

/// Persist a new update source URL.
///
/// # Errors
/// Returns an error when the config file cannot be written.
pub async fn put_config(
    State(state): State<AppState>,
    Json(payload): Json<UpdateConfigPayload>,
) -> Result<Json<serde_json::Value>, HttpError> {
    state.updater.set_update_url(&payload.update_url)?;
    Ok(Json(json!({ "success": true })))
}
