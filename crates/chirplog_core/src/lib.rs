//! Core domain library for chirplog (config, storage, models, page cache).

/// TTL cache for paginated record listings.
pub mod cache;
/// Configuration loading and defaults.
pub mod config;
/// Shared constants used across chirplog crates.
pub mod constants;
/// Database access layer.
pub mod db;
/// Application error types (storage/domain).
pub mod error;
/// Media attachment naming helpers.
pub mod media;
/// Data models for API requests and persistence.
pub mod models;

pub use cache::{PageCache, PageKey};
pub use config::Config;
pub use constants::*;
pub use db::Database;
pub use error::AppError;
