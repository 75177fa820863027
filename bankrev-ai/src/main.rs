//! bankrev-ai - review classification service
//!
//! Classifies bank customer reviews into (topic, sentiment) pairs through an
//! OpenAI-compatible inference endpoint, normalizes the labels against the
//! product taxonomy and stores them.

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::signal;
use tracing::{info, warn};

use bankrev_ai::services::{Classifier, RequestTemplate, VllmClient};
use bankrev_ai::{build_router, AppState};
use bankrev_common::config::{load_toml_config, resolve_config_path, resolve_database_path};
use bankrev_common::db::{init_database, seed_topics};
use bankrev_common::taxonomy::load_taxonomy;
use bankrev_common::Normalizer;

/// Command-line arguments
#[derive(Parser, Debug)]
#[command(name = "bankrev-ai")]
#[command(about = "Review classification service for bankrev")]
#[command(version)]
struct Args {
    /// Address to bind
    #[arg(long, default_value = "127.0.0.1", env = "BANKREV_AI_HOST")]
    host: String,

    /// Port to listen on
    #[arg(short, long, default_value = "5731", env = "BANKREV_AI_PORT")]
    port: u16,

    /// TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// SQLite database file
    #[arg(short, long)]
    database: Option<PathBuf>,

    /// Taxonomy TOML file (built-in taxonomy when omitted)
    #[arg(short, long, env = "BANKREV_TAXONOMY")]
    taxonomy: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Config is read first: it carries the default log level
    let config_path = resolve_config_path(args.config.as_deref());
    let toml_config = load_toml_config(config_path.as_deref())?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| toml_config.logging.level.as_str().into()),
        )
        .init();

    info!(
        "Starting bankrev-ai (Review Classification) v{} [{}] built {} ({})",
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

    let mut inference = toml_config.inference.clone();
    inference.apply_env_overrides();
    inference.validate()?;
    info!(
        url = %inference.url,
        model = %inference.model,
        max_connections = inference.max_connections,
        max_retries = inference.max_retries,
        "Inference endpoint configured"
    );

    let taxonomy_path = args.taxonomy.clone().or(toml_config.taxonomy_path.clone());
    let (taxonomy, aliases) = load_taxonomy(taxonomy_path.as_deref())?;

    let db_path = resolve_database_path(args.database.as_deref(), &toml_config);
    info!("Database: {}", db_path.display());
    let pool = init_database(&db_path).await?;
    let seeded = seed_topics(&pool, &taxonomy).await?;
    info!("✓ Database ready ({} new topics)", seeded);

    let backend = VllmClient::new(&inference)?;
    let template = RequestTemplate::from_taxonomy(&inference, &taxonomy);
    let classifier = Classifier::new(Arc::new(backend), &inference, template);
    let normalizer = Normalizer::new(Arc::new(taxonomy), Arc::new(aliases));

    let state = AppState::new(pool, classifier, normalizer);
    let app = build_router(state);

    let addr = format!("{}:{}", args.host, args.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("bankrev-ai listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("bankrev-ai stopped");
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
