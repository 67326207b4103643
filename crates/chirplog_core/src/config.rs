//! Configuration loading from environment variables.

use crate::constants::{
    DB_FILE_NAME, DEFAULT_CACHE_CAPACITY, DEFAULT_CACHE_TTL_MS, DEFAULT_MAX_UPLOAD_SIZE,
    DEFAULT_PAGE_SIZE, DEFAULT_PORT, DEFAULT_SEARCH_HISTORY_LIMIT,
};
use serde::Deserialize;
use std::env;
use std::path::{Path, PathBuf};

/// Runtime configuration for chirplog.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub data_dir: String,
    pub db_path: String,
    pub media_dir: String,
    pub port: u16,
    pub page_size: u64,
    pub max_upload_size: usize,
    pub cache_ttl_ms: u64,
    pub cache_capacity: usize,
    pub search_history_limit: u64,
    pub update_url: String,
}

/// Expand tilde (~) in paths to the user's home directory
fn expand_tilde(path: String) -> String {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = resolve_home_dir() {
            return home.join(rest).to_string_lossy().to_string();
        }
    }
    path
}

fn resolve_home_dir() -> Option<PathBuf> {
    // Prefer explicit HOME if set (Unix, some Windows shells)
    if let Ok(home) = env::var("HOME") {
        if !home.trim().is_empty() {
            return Some(PathBuf::from(home));
        }
    }

    // Windows USERPROFILE (standard)
    if let Ok(profile) = env::var("USERPROFILE") {
        if !profile.trim().is_empty() {
            return Some(PathBuf::from(profile));
        }
    }

    // Fallback to current directory if available
    std::env::current_dir().ok()
}

/// Parse a boolean-like environment flag value.
///
/// # Supported Values
/// - Truthy: `1`, `true`, `yes`, `on`
/// - Falsy: `0`, `false`, `no`, `off`, empty string
///
/// Matching is case-insensitive and ignores surrounding whitespace.
///
/// # Returns
/// `Some(bool)` when the value is recognized, otherwise `None`.
pub fn parse_env_flag(value: &str) -> Option<bool> {
    let normalized = value.trim().to_ascii_lowercase();
    match normalized.as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "" | "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Read a boolean flag from the environment.
///
/// Missing or unrecognized values are treated as `false`.
///
/// # Arguments
/// - `name`: Environment variable name.
///
/// # Returns
/// `true` when the value is a recognized truthy value.
pub fn env_flag_enabled(name: &str) -> bool {
    env::var(name)
        .ok()
        .and_then(|value| parse_env_flag(&value))
        .unwrap_or(false)
}

fn env_parsed<T: std::str::FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|value| value.trim().parse().ok())
        .unwrap_or(default)
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Returns
    /// A populated [`Config`] with defaults applied when env vars are missing.
    pub fn from_env() -> Self {
        let data_dir = env::var("DATA_DIR")
            .map(expand_tilde)
            .unwrap_or_else(|_| "./data".to_string());
        let db_path = env::var("DB_PATH").map(expand_tilde).unwrap_or_else(|_| {
            Path::new(&data_dir)
                .join(DB_FILE_NAME)
                .to_string_lossy()
                .to_string()
        });
        let media_dir = env::var("MEDIA_DIR")
            .map(expand_tilde)
            .unwrap_or_else(|_| "./media".to_string());

        Self {
            data_dir,
            db_path,
            media_dir,
            port: env_parsed("PORT", DEFAULT_PORT),
            page_size: env_parsed("PAGE_SIZE", DEFAULT_PAGE_SIZE).max(1),
            max_upload_size: env_parsed("MAX_UPLOAD_SIZE", DEFAULT_MAX_UPLOAD_SIZE),
            cache_ttl_ms: env_parsed("CACHE_TTL_MS", DEFAULT_CACHE_TTL_MS),
            cache_capacity: env_parsed("CACHE_CAPACITY", DEFAULT_CACHE_CAPACITY),
            search_history_limit: env_parsed("SEARCH_HISTORY_LIMIT", DEFAULT_SEARCH_HISTORY_LIMIT),
            update_url: env::var("UPDATE_URL").unwrap_or_default(),
        }
    }

    /// Create the data and media directories when missing.
    ///
    /// # Errors
    /// Returns any I/O error from directory creation.
    pub fn ensure_directories(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.data_dir)?;
        std::fs::create_dir_all(&self.media_dir)?;
        if let Some(parent) = Path::new(&self.db_path).parent() {
            std::fs::create_dir_all(parent)?;
        }
        Ok(())
    }

    /// Path of the update source configuration file inside the data dir.
    pub fn update_config_path(&self) -> PathBuf {
        Path::new(&self.data_dir).join(crate::constants::UPDATE_CONFIG_FILE_NAME)
    }

    /// Path of the local data version marker inside the data dir.
    pub fn version_file_path(&self) -> PathBuf {
        Path::new(&self.data_dir).join(crate::constants::VERSION_FILE_NAME)
    }
}

#[cfg(test)]
mod tests {
    use super::parse_env_flag;

    #[test]
    fn parse_env_flag_accepts_truthy_values() {
        for value in ["1", "true", "TRUE", " yes ", "on"] {
            assert_eq!(parse_env_flag(value), Some(true), "value: {}", value);
        }
    }

    #[test]
    fn parse_env_flag_accepts_falsy_values() {
        for value in ["", "0", "false", "FALSE", " no ", "off"] {
            assert_eq!(parse_env_flag(value), Some(false), "value: {}", value);
        }
    }

    #[test]
    fn parse_env_flag_rejects_unknown_values() {
        assert_eq!(parse_env_flag("maybe"), None);
        assert_eq!(parse_env_flag("enabled"), None);
    }
}
