//! Headless API server entrypoint.

use chirplog_server::{config::Config, db::Database, serve_router, AppState};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct CliFlags {
    help: bool,
    check_update: bool,
}

fn parse_cli_flags(args: &[String]) -> anyhow::Result<CliFlags> {
    let mut flags = CliFlags::default();
    for arg in args.iter().skip(1) {
        match arg.as_str() {
            "--help" => flags.help = true,
            "--check-update" => flags.check_update = true,
            value if value.starts_with('-') => {
                anyhow::bail!(
                    "Unknown option: '{}'. Use --help to see supported options.",
                    value
                );
            }
            value => {
                anyhow::bail!(
                    "Unexpected positional argument: '{}'. Use --help to see supported options.",
                    value
                );
            }
        }
    }
    Ok(flags)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "chirplog=info,tower_http=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args: Vec<String> = std::env::args().collect();
    let cli_flags = parse_cli_flags(&args)?;

    if cli_flags.help {
        print_help();
        return Ok(());
    }

    let config = Config::from_env();
    config.ensure_directories()?;

    let database = Database::open(&config.db_path)?;
    let state = AppState::new(config.clone(), database);

    if cli_flags.check_update {
        let check = state.updater.check().await;
        println!("{}", serde_json::to_string_pretty(&check)?);
        return Ok(());
    }

    let allow_public = chirplog_server::config::env_flag_enabled("ALLOW_PUBLIC_ACCESS");
    if allow_public {
        tracing::warn!("Public access enabled - server will accept requests from any origin");
    }

    let bind_addr = chirplog_server::resolve_bind_address(&config, allow_public);
    if !bind_addr.ip().is_loopback() {
        tracing::warn!(
            "Binding to non-localhost address: {} - ensure proper security measures are in place",
            bind_addr
        );
    }

    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    let actual_addr = listener.local_addr().unwrap_or(bind_addr);
    tracing::info!("chirplog running at http://{}", actual_addr);

    serve_router(listener, state, allow_public, shutdown_signal()).await?;

    tracing::info!("Server stopped");
    Ok(())
}

fn print_help() {
    println!("chirplog server\n");
    println!("Usage: chirplog [OPTIONS]\n");
    println!("Options:");
    println!("  --check-update    Query the update source and exit");
    println!("  --help            Show this help message");
    println!("\nEnvironment variables:");
    println!("  DATA_DIR             Data directory (default: ./data)");
    println!("  DB_PATH              Database path (default: DATA_DIR/records.db)");
    println!("  MEDIA_DIR            Media attachment directory (default: ./media)");
    println!("  PORT                 Server port (default: 3000)");
    println!("  PAGE_SIZE            Records per page (default: 6)");
    println!("  MAX_UPLOAD_SIZE      Maximum upload size in bytes (default: 100MB)");
    println!("  CACHE_TTL_MS         Page cache TTL in milliseconds (default: 300000)");
    println!("  UPDATE_URL           Online update source base URL");
    println!("  ALLOW_PUBLIC_ACCESS  Allow CORS from any origin");
    println!("  BIND                 Override bind address (e.g. 0.0.0.0:3000)");
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
