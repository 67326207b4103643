//! Online self-update client.
//!
//! The journal's canonical data can live on a remote static host exposing
//! `version.json`, a database snapshot under `data/`, and media files under
//! `media/`. The updater compares the remote version against the local
//! marker, swaps in a downloaded database snapshot, and additively syncs
//! media files.

use chirplog_core::constants::DB_FILE_NAME;
use chirplog_core::{media, AppError, Config, Database, PageCache};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
const FALLBACK_VERSION: &str = "0.0.0";

/// Remote `version.json` payload.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VersionInfo {
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub info: String,
    #[serde(default)]
    pub db_size: u64,
    #[serde(default)]
    pub media_count: u64,
    #[serde(default)]
    pub media_files: Vec<String>,
}

/// Result of an update check.
#[derive(Debug, Clone, Serialize)]
pub struct UpdateCheck {
    pub has_update: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub local_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub update_info: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub db_size: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media_count: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl UpdateCheck {
    fn failed(error: String) -> Self {
        Self {
            has_update: false,
            local_version: None,
            remote_version: None,
            update_info: None,
            db_size: None,
            media_count: None,
            error: Some(error),
        }
    }
}

/// One media file that failed to sync.
#[derive(Debug, Clone, Serialize)]
pub struct MediaFailure {
    pub file: String,
    pub error: String,
}

/// Result of an additive media sync.
#[derive(Debug, Clone, Serialize)]
pub struct MediaSyncReport {
    pub success: bool,
    pub downloaded: usize,
    pub skipped: usize,
    pub failed: Vec<MediaFailure>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct UpdateSourceConfig {
    update_url: String,
}

/// Compare two dotted version strings component-wise.
///
/// Non-numeric components count as zero, so `0.10.0` sorts above `0.9.1`.
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    let parse = |value: &str| -> Vec<u64> {
        value
            .trim()
            .split('.')
            .map(|part| part.trim().parse().unwrap_or(0))
            .collect()
    };
    let left = parse(a);
    let right = parse(b);
    let len = left.len().max(right.len());
    for i in 0..len {
        let l = left.get(i).copied().unwrap_or(0);
        let r = right.get(i).copied().unwrap_or(0);
        match l.cmp(&r) {
            Ordering::Equal => continue,
            other => return other,
        }
    }
    Ordering::Equal
}

/// Pull-based updater for the journal's remote data source.
pub struct Updater {
    client: reqwest::Client,
    config_path: PathBuf,
    version_path: PathBuf,
    media_dir: PathBuf,
    update_url: Mutex<String>,
    version_info: Mutex<Option<VersionInfo>>,
}

fn load_update_url(config_path: &Path) -> Option<String> {
    let raw = std::fs::read_to_string(config_path).ok()?;
    let config: UpdateSourceConfig = serde_json::from_str(&raw).ok()?;
    if config.update_url.is_empty() {
        None
    } else {
        Some(config.update_url)
    }
}

impl Updater {
    /// Build an updater from the loaded configuration.
    ///
    /// A persisted `update_config.json` takes precedence over the
    /// `UPDATE_URL` environment default.
    pub fn from_config(config: &Config) -> Self {
        let config_path = config.update_config_path();
        let update_url =
            load_update_url(&config_path).unwrap_or_else(|| config.update_url.clone());
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self {
            client,
            config_path,
            version_path: config.version_file_path(),
            media_dir: PathBuf::from(&config.media_dir),
            update_url: Mutex::new(update_url),
            version_info: Mutex::new(None),
        }
    }

    /// The configured update source URL.
    pub fn update_url(&self) -> String {
        self.update_url
            .lock()
            .map(|url| url.clone())
            .unwrap_or_default()
    }

    /// Persist and activate a new update source URL.
    ///
    /// # Errors
    /// Returns an error when the config file cannot be written.
    pub fn set_update_url(&self, url: &str) -> Result<(), AppError> {
        let config = UpdateSourceConfig {
            update_url: url.trim().to_string(),
        };
        let encoded = serde_json::to_string_pretty(&config)
            .map_err(|err| AppError::StorageMessage(err.to_string()))?;
        if let Some(parent) = self.config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.config_path, encoded)?;
        if let Ok(mut guard) = self.update_url.lock() {
            *guard = config.update_url;
        }
        Ok(())
    }

    fn local_version(&self) -> String {
        std::fs::read_to_string(&self.version_path)
            .map(|raw| raw.trim().to_string())
            .ok()
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| FALLBACK_VERSION.to_string())
    }

    fn save_local_version(&self, version: &str) -> Result<(), AppError> {
        if let Some(parent) = self.version_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.version_path, version)?;
        Ok(())
    }

    fn remembered_version_info(&self) -> Option<VersionInfo> {
        self.version_info.lock().ok().and_then(|guard| guard.clone())
    }

    /// Fetch the remote version manifest and compare with the local marker.
    ///
    /// Network failures are reported inside the result rather than as
    /// errors, matching the polling UI this feeds.
    pub async fn check(&self) -> UpdateCheck {
        let base_url = self.update_url();
        if base_url.is_empty() {
            return UpdateCheck::failed("no update source configured".to_string());
        }

        let version_url = format!("{}/version.json", base_url.trim_end_matches('/'));
        let info: VersionInfo = match self.fetch_json(&version_url).await {
            Ok(info) => info,
            Err(err) => return UpdateCheck::failed(err.to_string()),
        };

        if let Ok(mut guard) = self.version_info.lock() {
            *guard = Some(info.clone());
        }

        let local_version = self.local_version();
        let has_update = compare_versions(&info.version, &local_version) == Ordering::Greater;
        UpdateCheck {
            has_update,
            local_version: Some(local_version),
            remote_version: Some(info.version),
            update_info: Some(info.info),
            db_size: Some(info.db_size),
            media_count: Some(info.media_count),
            error: None,
        }
    }

    async fn fetch_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T, AppError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|err| AppError::StorageMessage(format!("update request failed: {}", err)))?;
        if !response.status().is_success() {
            return Err(AppError::StorageMessage(format!(
                "update source returned {} for {}",
                response.status(),
                url
            )));
        }
        response
            .json()
            .await
            .map_err(|err| AppError::StorageMessage(format!("invalid update manifest: {}", err)))
    }

    async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>, AppError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|err| AppError::StorageMessage(format!("update request failed: {}", err)))?;
        if !response.status().is_success() {
            return Err(AppError::StorageMessage(format!(
                "update source returned {} for {}",
                response.status(),
                url
            )));
        }
        Ok(response
            .bytes()
            .await
            .map_err(|err| AppError::StorageMessage(format!("update download failed: {}", err)))?
            .to_vec())
    }

    /// Download the remote database snapshot and swap it in.
    ///
    /// The previous file is kept as a `.backup` sibling and restored when the
    /// swap fails. The page cache is invalidated after a successful swap.
    ///
    /// # Errors
    /// Returns an error when the download or swap fails.
    pub async fn download_database(
        &self,
        db: &Database,
        cache: &PageCache,
    ) -> Result<(), AppError> {
        let base_url = self.update_url();
        if base_url.is_empty() {
            return Err(AppError::BadRequest(
                "no update source configured".to_string(),
            ));
        }

        let db_url = format!("{}/data/{}", base_url.trim_end_matches('/'), DB_FILE_NAME);
        let bytes = self.fetch_bytes(&db_url).await?;

        let temp_path = PathBuf::from(format!("{}.tmp", db.path().display()));
        std::fs::write(&temp_path, &bytes)?;

        if let Err(err) = db.replace_with_file(&temp_path) {
            let _ = std::fs::remove_file(&temp_path);
            return Err(err);
        }
        cache.invalidate_all();
        tracing::info!("Database replaced from update source ({} bytes)", bytes.len());

        if let Some(info) = self.remembered_version_info() {
            if !info.version.is_empty() {
                self.save_local_version(&info.version)?;
            }
        }
        Ok(())
    }

    /// Additively sync remote media files, skipping ones already present.
    ///
    /// Requires a prior successful [`Updater::check`] to know the file list.
    pub async fn download_media(&self) -> MediaSyncReport {
        let Some(info) = self.remembered_version_info() else {
            return MediaSyncReport {
                success: false,
                downloaded: 0,
                skipped: 0,
                failed: Vec::new(),
                error: Some("version manifest not fetched; run a check first".to_string()),
            };
        };

        let base_url = self.update_url();
        let mut downloaded = 0usize;
        let mut failed: Vec<MediaFailure> = Vec::new();

        for file in &info.media_files {
            let safe_name = match media::sanitize_file_name(file) {
                Ok(name) => name,
                Err(err) => {
                    failed.push(MediaFailure {
                        file: file.clone(),
                        error: err.to_string(),
                    });
                    continue;
                }
            };
            let target = self.media_dir.join(safe_name);
            if target.exists() {
                continue;
            }

            let url = format!("{}/media/{}", base_url.trim_end_matches('/'), safe_name);
            match self.fetch_bytes(&url).await {
                Ok(bytes) => {
                    let write = std::fs::create_dir_all(&self.media_dir)
                        .and_then(|_| std::fs::write(&target, &bytes));
                    match write {
                        Ok(()) => downloaded += 1,
                        Err(err) => failed.push(MediaFailure {
                            file: file.clone(),
                            error: err.to_string(),
                        }),
                    }
                }
                Err(err) => failed.push(MediaFailure {
                    file: file.clone(),
                    error: err.to_string(),
                }),
            }
        }

        MediaSyncReport {
            success: true,
            downloaded,
            skipped: info.media_files.len() - downloaded - failed.len(),
            failed,
            error: None,
        }
    }

    /// Run a full update: database first, then media.
    pub async fn update_all(&self, db: &Database, cache: &PageCache) -> serde_json::Value {
        let db_result = self.download_database(db, cache).await;
        let db_updated = db_result.is_ok();
        let db_report = match db_result {
            Ok(()) => serde_json::json!({ "success": true }),
            Err(err) => serde_json::json!({ "success": false, "error": err.to_string() }),
        };

        let media_report = self.download_media().await;
        let media_updated = media_report.success;

        serde_json::json!({
            "db_updated": db_updated,
            "media_updated": media_updated,
            "db_result": db_report,
            "media_result": media_report,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{compare_versions, load_update_url, Updater};
    use chirplog_core::Config;
    use std::cmp::Ordering;

    fn config_in(dir: &std::path::Path) -> Config {
        Config {
            data_dir: dir.join("data").to_string_lossy().to_string(),
            db_path: dir.join("data/records.db").to_string_lossy().to_string(),
            media_dir: dir.join("media").to_string_lossy().to_string(),
            port: 0,
            page_size: 6,
            max_upload_size: 1024,
            cache_ttl_ms: 0,
            cache_capacity: 0,
            search_history_limit: 10,
            update_url: "https://example.org/base".to_string(),
        }
    }

    #[test]
    fn version_compare_is_numeric_per_component() {
        assert_eq!(compare_versions("1.2.0", "1.2.0"), Ordering::Equal);
        assert_eq!(compare_versions("0.10.0", "0.9.1"), Ordering::Greater);
        assert_eq!(compare_versions("1.0", "1.0.1"), Ordering::Less);
        assert_eq!(compare_versions("2", "1.9.9"), Ordering::Greater);
        assert_eq!(compare_versions("abc", "0.0.1"), Ordering::Less);
    }

    #[test]
    fn update_url_roundtrips_through_config_file() {
        let temp = tempfile::TempDir::new().expect("temp dir");
        let config = config_in(temp.path());
        let updater = Updater::from_config(&config);
        assert_eq!(updater.update_url(), "https://example.org/base");

        updater
            .set_update_url("https://mirror.example.org/journal")
            .expect("persist url");
        assert_eq!(updater.update_url(), "https://mirror.example.org/journal");

        // A fresh updater picks the persisted URL over the env default.
        let reloaded = Updater::from_config(&config);
        assert_eq!(reloaded.update_url(), "https://mirror.example.org/journal");
        assert_eq!(
            load_update_url(&config.update_config_path()).as_deref(),
            Some("https://mirror.example.org/journal")
        );
    }

    #[test]
    fn local_version_defaults_until_saved() {
        let temp = tempfile::TempDir::new().expect("temp dir");
        let updater = Updater::from_config(&config_in(temp.path()));
        assert_eq!(updater.local_version(), "0.0.0");

        updater.save_local_version("1.4.2").expect("save version");
        assert_eq!(updater.local_version(), "1.4.2");
    }
}
