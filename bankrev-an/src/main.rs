//! bankrev-an - dashboard analytics service
//!
//! Serves sentiment KPIs, key aspects, dynamics series and the latest reviews
//! from the review store populated by bankrev-ai. Read-only.

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tokio::signal;
use tracing::{error, info, warn};

use bankrev_an::{build_router, AppState};
use bankrev_common::config::{load_toml_config, resolve_config_path, resolve_database_path};

#[derive(Parser, Debug)]
#[command(name = "bankrev-an")]
#[command(about = "Review analytics service for bankrev")]
#[command(version)]
struct Args {
    /// Address to bind
    #[arg(long, default_value = "127.0.0.1", env = "BANKREV_AN_HOST")]
    host: String,

    /// Port to listen on
    #[arg(short, long, default_value = "5732", env = "BANKREV_AN_PORT")]
    port: u16,

    /// TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// SQLite database file
    #[arg(short, long)]
    database: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config_path = resolve_config_path(args.config.as_deref());
    let toml_config = load_toml_config(config_path.as_deref())?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| toml_config.logging.level.as_str().into()),
        )
        .init();

    info!(
        "Starting bankrev-an (Review Analytics) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    match &config_path {
        Some(path) if path.exists() => info!("Config: {}", path.display()),
        Some(path) => warn!("Config file {} not found, using built-in defaults", path.display()),
        None => info!("No config file, using built-in defaults"),
    }

    let db_path = resolve_database_path(args.database.as_deref(), &toml_config);
    info!("Database path: {}", db_path.display());

    let pool = match bankrev_an::db::connect_readonly(&db_path).await {
        Ok(pool) => {
            info!("✓ Connected to database (read-only)");
            pool
        }
        Err(e) => {
            error!("Failed to connect to database: {}", e);
            return Err(e);
        }
    };

    let app = build_router(AppState::new(pool));

    let addr = format!("{}:{}", args.host, args.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("bankrev-an listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
