//! Media attachment upload handler.

use crate::error::HttpError;
use crate::AppState;
use axum::extract::{Multipart, State};
use axum::Json;
use chirplog_core::{media, AppError};
use serde_json::json;

fn multipart_err(err: axum::extract::multipart::MultipartError) -> AppError {
    AppError::BadRequest(format!("invalid multipart payload: {}", err))
}

/// Store an uploaded attachment under the media directory.
///
/// Expects a multipart form with a `file` part plus optional `datetime` and
/// `recordId` fields that shape the stored name
/// (`{timestamp}_{record_id}_{index}{ext}`).
///
/// # Returns
/// `{success: true, path: "media/<name>"}` as JSON.
///
/// # Errors
/// Returns 400 when no usable file part is present.
pub async fn save_media_file(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<serde_json::Value>, HttpError> {
    let mut file_data: Option<Vec<u8>> = None;
    let mut original_name: Option<String> = None;
    let mut datetime: Option<String> = None;
    let mut record_id = String::from("1");

    while let Some(field) = multipart.next_field().await.map_err(multipart_err)? {
        match field.name() {
            Some("file") => {
                original_name = field.file_name().map(ToString::to_string);
                file_data = Some(field.bytes().await.map_err(multipart_err)?.to_vec());
            }
            Some("datetime") => {
                datetime = Some(field.text().await.map_err(multipart_err)?);
            }
            Some("recordId") => {
                record_id = field.text().await.map_err(multipart_err)?;
            }
            _ => {}
        }
    }

    let (Some(data), Some(original_name)) = (file_data, original_name) else {
        return Err(AppError::BadRequest("no file data received".to_string()).into());
    };

    let file_name = media::media_file_name(
        &original_name,
        datetime.as_deref(),
        &record_id,
        chrono::Utc::now().timestamp(),
    )?;

    tokio::fs::create_dir_all(&state.config.media_dir)
        .await
        .map_err(AppError::from)?;
    let target = std::path::Path::new(&state.config.media_dir).join(&file_name);
    tokio::fs::write(&target, &data)
        .await
        .map_err(AppError::from)?;
    tracing::info!("Saved media attachment {}", target.display());

    Ok(Json(json!({
        "success": true,
        "message": "file saved",
        "path": format!("media/{}", file_name),
    })))
}
