//! HTTP server wiring for chirplog (API, handlers, and shared state).

/// HTTP error mapping for API handlers.
pub mod error;
/// HTTP handlers for records, search, stats, media, and updates.
pub mod handlers;
/// Online self-update client.
pub mod update;

pub use chirplog_core::{config, db, models, AppError, Config, Database, PageCache};
pub use update::Updater;

use axum::{
    extract::DefaultBodyLimit,
    http::header,
    routing::{delete, get, post},
    Router,
};
use hyper::HeaderMap;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer, cors::CorsLayer, services::ServeDir,
    set_header::SetResponseHeaderLayer, trace::TraceLayer,
};

/// Shared state passed to HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Database>,
    pub config: Arc<Config>,
    pub cache: Arc<PageCache>,
    pub updater: Arc<Updater>,
}

impl AppState {
    /// Construct shared application state.
    ///
    /// # Arguments
    /// - `config`: Loaded configuration.
    /// - `db`: Open database handle.
    ///
    /// # Returns
    /// A new [`AppState`] with the page cache and updater wired in.
    pub fn new(config: Config, db: Database) -> Self {
        let cache = Arc::new(PageCache::new(
            Duration::from_millis(config.cache_ttl_ms),
            config.cache_capacity,
        ));
        let updater = Arc::new(Updater::from_config(&config));
        Self {
            db: Arc::new(db),
            config: Arc::new(config),
            cache,
            updater,
        }
    }
}

/// Resolve the listener address from env var overrides and security policy.
///
/// # Arguments
/// - `config`: Server configuration containing the configured `port`.
/// - `allow_public_access`: Whether non-loopback bind targets are permitted.
///
/// # Returns
/// A validated socket address that enforces loopback when public access is
/// disabled.
pub fn resolve_bind_address(config: &Config, allow_public_access: bool) -> SocketAddr {
    let default_bind = SocketAddr::from(([127, 0, 0, 1], config.port));
    let requested = match std::env::var("BIND") {
        Ok(value) => match value.trim().parse::<SocketAddr>() {
            Ok(addr) => addr,
            Err(err) => {
                tracing::warn!(
                    "Invalid BIND='{}': {}. Falling back to {}",
                    value,
                    err,
                    default_bind
                );
                default_bind
            }
        },
        Err(_) => default_bind,
    };

    if allow_public_access || requested.ip().is_loopback() {
        return requested;
    }

    tracing::warn!(
        "Non-loopback bind {} requested without ALLOW_PUBLIC_ACCESS; forcing 127.0.0.1",
        requested
    );
    SocketAddr::from(([127, 0, 0, 1], requested.port()))
}

/// Create the application router with all routes and middleware.
///
/// # Arguments
/// - `state`: Shared application state.
/// - `allow_public_access`: Whether to allow cross-origin requests from any
///   origin.
///
/// # Returns
/// Configured `axum::Router`.
///
/// # Panics
/// Panics if static header values fail to parse (should not happen).
pub fn create_app(state: AppState, allow_public_access: bool) -> Router {
    let cors_port = state.config.port;
    create_app_with_cors_port(state, allow_public_access, cors_port)
}

fn create_app_with_cors_port(state: AppState, allow_public_access: bool, cors_port: u16) -> Router {
    let mut default_headers = HeaderMap::new();
    default_headers.insert(header::X_CONTENT_TYPE_OPTIONS, "nosniff".parse().unwrap());
    default_headers.insert(header::X_FRAME_OPTIONS, "DENY".parse().unwrap());
    default_headers.insert(
        header::CONTENT_SECURITY_POLICY,
        "default-src 'self'; script-src 'self'; style-src 'self' 'unsafe-inline'; img-src 'self' data:; media-src 'self'; connect-src 'self'; frame-ancestors 'none'; base-uri 'self'"
            .parse()
            .unwrap(),
    );

    let cors = if allow_public_access {
        CorsLayer::new()
            .allow_origin(tower_http::cors::Any)
            .allow_methods([
                axum::http::Method::GET,
                axum::http::Method::POST,
                axum::http::Method::PUT,
                axum::http::Method::DELETE,
            ])
            .allow_headers(tower_http::cors::Any)
    } else {
        CorsLayer::new()
            .allow_origin([
                format!("http://localhost:{}", cors_port).parse().unwrap(),
                format!("http://127.0.0.1:{}", cors_port).parse().unwrap(),
            ])
            .allow_methods([
                axum::http::Method::GET,
                axum::http::Method::POST,
                axum::http::Method::PUT,
                axum::http::Method::DELETE,
            ])
            .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
    };

    let media_dir = state.config.media_dir.clone();

    Router::new()
        // Record listing and CRUD
        .route(
            "/api/records",
            get(handlers::record::list_records).post(handlers::record::create_record),
        )
        .route(
            "/api/records/:id",
            get(handlers::record::get_record)
                .put(handlers::record::update_record)
                .delete(handlers::record::delete_record),
        )
        // Pagination bootstrap and page locators
        .route("/api/total-count", get(handlers::record::total_count))
        .route("/api/init-data", get(handlers::record::init_data))
        .route("/api/latest-page", get(handlers::record::latest_page))
        .route("/api/record/:id/page", get(handlers::record::record_page))
        .route(
            "/api/year-month/:year/:month/page",
            get(handlers::stats::year_month_page),
        )
        .route(
            "/api/channel/:channel/page",
            get(handlers::stats::channel_page),
        )
        // Search and history
        .route("/api/search", get(handlers::search::search))
        .route("/api/on-this-day", get(handlers::search::on_this_day))
        .route(
            "/api/search-history",
            get(handlers::search::list_history).post(handlers::search::add_history),
        )
        .route(
            "/api/search-history/:keyword",
            delete(handlers::search::delete_history),
        )
        // Navigation trees and statistics
        .route("/api/year-months", get(handlers::stats::year_month_tree))
        .route("/api/channels", get(handlers::stats::channels))
        .route(
            "/api/stats/year-month",
            get(handlers::stats::year_month_tree),
        )
        .route("/api/stats/channels", get(handlers::stats::channels))
        .route("/api/stats/summary", get(handlers::stats::summary))
        .route("/api/stats/combined", get(handlers::stats::combined))
        // Reading progress
        .route(
            "/api/progress",
            get(handlers::progress::get_progress).post(handlers::progress::set_progress),
        )
        // Media attachments
        .route(
            "/api/save-media-file",
            post(handlers::media::save_media_file),
        )
        .nest_service("/media", ServeDir::new(media_dir))
        // Online updates
        .route("/api/update/check", get(handlers::update::check))
        .route(
            "/api/update/database",
            post(handlers::update::update_database),
        )
        .route("/api/update/media", post(handlers::update::update_media))
        .route("/api/update/all", post(handlers::update::update_all))
        .route(
            "/api/update/config",
            get(handlers::update::get_config).put(handlers::update::put_config),
        )
        .with_state(state.clone())
        .layer(
            tower::ServiceBuilder::new()
                .layer(DefaultBodyLimit::max(state.config.max_upload_size))
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(cors)
                .layer(SetResponseHeaderLayer::overriding(
                    header::CONTENT_SECURITY_POLICY,
                    default_headers
                        .get(header::CONTENT_SECURITY_POLICY)
                        .unwrap()
                        .clone(),
                ))
                .layer(SetResponseHeaderLayer::overriding(
                    header::X_CONTENT_TYPE_OPTIONS,
                    default_headers
                        .get(header::X_CONTENT_TYPE_OPTIONS)
                        .unwrap()
                        .clone(),
                ))
                .layer(SetResponseHeaderLayer::overriding(
                    header::X_FRAME_OPTIONS,
                    default_headers.get(header::X_FRAME_OPTIONS).unwrap().clone(),
                )),
        )
}

fn listener_cors_port(listener: &tokio::net::TcpListener, fallback_port: u16) -> u16 {
    listener
        .local_addr()
        .map(|addr| addr.port())
        .unwrap_or(fallback_port)
}

/// Run the Axum server with graceful shutdown support.
///
/// # Arguments
/// - `listener`: Bound TCP listener for the server.
/// - `state`: Shared application state.
/// - `allow_public_access`: Whether to allow cross-origin requests from any
///   origin.
/// - `shutdown_signal`: Future that resolves when shutdown should start.
///
/// # Returns
/// `Ok(())` when the server exits cleanly.
///
/// # Errors
/// Returns any I/O error produced by `axum::serve`.
pub async fn serve_router(
    listener: tokio::net::TcpListener,
    state: AppState,
    allow_public_access: bool,
    shutdown_signal: impl Future<Output = ()> + Send + 'static,
) -> Result<(), std::io::Error> {
    let cors_port = listener_cors_port(&listener, state.config.port);
    let app = create_app_with_cors_port(state, allow_public_access, cors_port);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await
}

#[cfg(test)]
mod tests {
    use super::listener_cors_port;
    use super::resolve_bind_address;
    use chirplog_core::Config;
    use std::net::SocketAddr;

    fn test_config(port: u16) -> Config {
        Config {
            data_dir: "/tmp/chirplog-data".to_string(),
            db_path: "/tmp/chirplog-data/records.db".to_string(),
            media_dir: "/tmp/chirplog-media".to_string(),
            port,
            page_size: 6,
            max_upload_size: 1024,
            cache_ttl_ms: 0,
            cache_capacity: 0,
            search_history_limit: 10,
            update_url: String::new(),
        }
    }

    #[tokio::test]
    async fn listener_cors_port_uses_bound_listener_port() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("listener");
        let expected = listener.local_addr().expect("listener addr").port();
        let resolved = listener_cors_port(&listener, 3000);
        assert_eq!(resolved, expected);
    }

    #[test]
    fn resolve_bind_address_enforces_loopback_when_public_access_disabled() {
        let config = test_config(4040);
        std::env::set_var("BIND", "0.0.0.0:4040");
        let resolved = resolve_bind_address(&config, false);
        assert_eq!(resolved.ip().to_string(), "127.0.0.1");
        assert_eq!(resolved.port(), 4040);
        std::env::remove_var("BIND");
    }

    #[test]
    fn resolve_bind_address_allows_loopback_and_invalid_fallback() {
        let config = test_config(4041);
        let loopback = resolve_bind_address(&config, false);
        assert_eq!(loopback, SocketAddr::from(([127, 0, 0, 1], 4041)));

        std::env::set_var("BIND", "bad:host");
        let fallback = resolve_bind_address(&config, false);
        assert_eq!(fallback, SocketAddr::from(([127, 0, 0, 1], 4041)));
        std::env::remove_var("BIND");
    }
}
