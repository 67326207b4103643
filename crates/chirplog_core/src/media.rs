//! Media attachment naming helpers.
//!
//! Uploaded files are stored under the media directory as
//! `{timestamp}_{record_id}_{index}{ext}`, where the timestamp is derived
//! from the record's datetime (`YYYYMMDDHHMM`) when available and the index
//! preserves multi-attachment ordering from the client's file name.

use crate::error::AppError;
use crate::models::record::DATETIME_FORMAT;
use chrono::NaiveDateTime;

/// Reduce a client-supplied file name to a safe base name.
///
/// # Errors
/// Returns `BadRequest` when nothing usable remains after stripping path
/// components.
pub fn sanitize_file_name(name: &str) -> Result<&str, AppError> {
    let base = name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .trim();
    if base.is_empty() || base == "." || base == ".." {
        return Err(AppError::BadRequest(format!(
            "invalid upload file name '{}'",
            name
        )));
    }
    Ok(base)
}

/// Extension of `name` including the dot, or an empty string.
pub fn file_extension(name: &str) -> &str {
    match name.rfind('.') {
        Some(idx) if idx > 0 => &name[idx..],
        _ => "",
    }
}

fn file_stem(name: &str) -> &str {
    match name.rfind('.') {
        Some(idx) if idx > 0 => &name[..idx],
        _ => name,
    }
}

/// Attachment index carried in a client file name of the form
/// `{ts}_{record}_{index}.ext`; defaults to `1`.
pub fn upload_index(file_name: &str) -> &str {
    let stem = file_stem(file_name);
    let parts: Vec<&str> = stem.split('_').collect();
    match parts.last() {
        Some(last) if parts.len() >= 3 && last.bytes().all(|b| b.is_ascii_digit()) => last,
        _ => "1",
    }
}

/// Timestamp component for a stored media name.
///
/// Parses the record datetime into `YYYYMMDDHHMM`; falls back to the current
/// unix time when the datetime is missing or malformed.
pub fn timestamp_component(datetime: Option<&str>, now_unix: i64) -> String {
    datetime
        .and_then(|value| NaiveDateTime::parse_from_str(value.trim(), DATETIME_FORMAT).ok())
        .map(|parsed| parsed.format("%Y%m%d%H%M").to_string())
        .unwrap_or_else(|| now_unix.to_string())
}

/// Build the stored file name for one uploaded attachment.
///
/// # Arguments
/// - `original_name`: Client file name (used for extension and index).
/// - `datetime`: Record datetime the attachment belongs to.
/// - `record_id`: Record id form field; non-numeric input falls back to `1`.
/// - `now_unix`: Current unix time, used when `datetime` is unusable.
///
/// # Errors
/// Returns `BadRequest` when the original name is unusable.
pub fn media_file_name(
    original_name: &str,
    datetime: Option<&str>,
    record_id: &str,
    now_unix: i64,
) -> Result<String, AppError> {
    let base = sanitize_file_name(original_name)?;
    let record_id = match record_id.trim() {
        id if !id.is_empty() && id.bytes().all(|b| b.is_ascii_digit()) => id,
        _ => "1",
    };
    Ok(format!(
        "{}_{}_{}{}",
        timestamp_component(datetime, now_unix),
        record_id,
        upload_index(base),
        file_extension(base)
    ))
}

#[cfg(test)]
mod tests {
    use super::{file_extension, media_file_name, sanitize_file_name, upload_index};

    #[test]
    fn sanitize_strips_path_components() {
        assert_eq!(
            sanitize_file_name("../../etc/passwd.png").expect("sanitized"),
            "passwd.png"
        );
        assert_eq!(
            sanitize_file_name("C:\\Users\\me\\cat.jpg").expect("sanitized"),
            "cat.jpg"
        );
        assert!(sanitize_file_name("media/").is_err());
        assert!(sanitize_file_name("..").is_err());
    }

    #[test]
    fn extension_includes_dot_and_handles_dotfiles() {
        assert_eq!(file_extension("cat.jpg"), ".jpg");
        assert_eq!(file_extension("archive.tar.gz"), ".gz");
        assert_eq!(file_extension("noext"), "");
        assert_eq!(file_extension(".hidden"), "");
    }

    #[test]
    fn upload_index_reads_trailing_numeric_part() {
        assert_eq!(upload_index("202107030815_12_3.png"), "3");
        assert_eq!(upload_index("photo.png"), "1");
        assert_eq!(upload_index("a_b.png"), "1");
        assert_eq!(upload_index("a_b_x.png"), "1");
    }

    #[test]
    fn media_name_uses_record_datetime_when_present() {
        let name = media_file_name(
            "upload_12_2.jpg",
            Some("2021-07-03 08:15:00"),
            "12",
            1_700_000_000,
        )
        .expect("name");
        assert_eq!(name, "202107030815_12_2.jpg");
    }

    #[test]
    fn media_name_falls_back_to_unix_time_and_default_id() {
        let name =
            media_file_name("cat.mp4", Some("not a datetime"), "../7", 1_700_000_000).expect("name");
        assert_eq!(name, "1700000000_1_1.mp4");
    }
}
