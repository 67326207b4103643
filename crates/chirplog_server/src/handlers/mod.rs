//! HTTP request handlers.

/// Media attachment upload.
pub mod media;
/// Reading progress endpoints.
pub mod progress;
/// Record listing and CRUD endpoints.
pub mod record;
/// Keyword search and search history endpoints.
pub mod search;
/// Navigation trees, statistics, and page locators.
pub mod stats;
/// Online update endpoints.
pub mod update;
