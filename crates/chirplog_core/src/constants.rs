//! Shared constants used across chirplog crates.

/// Default API port.
pub const DEFAULT_PORT: u16 = 3000;

/// Default number of records per listing page.
pub const DEFAULT_PAGE_SIZE: u64 = 6;

/// Default maximum upload size accepted by the media endpoint.
pub const DEFAULT_MAX_UPLOAD_SIZE: usize = 100 * 1024 * 1024;

/// Default page cache time-to-live in milliseconds.
pub const DEFAULT_CACHE_TTL_MS: u64 = 5 * 60 * 1000;

/// Default upper bound on cached listing pages.
pub const DEFAULT_CACHE_CAPACITY: usize = 256;

/// Default number of search history entries returned.
pub const DEFAULT_SEARCH_HISTORY_LIMIT: u64 = 10;

/// Database file name inside the data directory.
pub const DB_FILE_NAME: &str = "records.db";

/// Update source configuration file inside the data directory.
pub const UPDATE_CONFIG_FILE_NAME: &str = "update_config.json";

/// Local data version marker inside the data directory.
pub const VERSION_FILE_NAME: &str = "version.txt";
