//! Coordination Engine (huddle-ce) - Main entry point
//!
//! HTTP service wrapping the Interest Ledger, Recommendation Scorer,
//! Threshold Coordinator, and Action Item Store.

use anyhow::{Context, Result};
use clap::Parser;
use huddle_ce::state::AppState;
use huddle_ce::{actions, api};
use huddle_common::config::{default_config_file, EngineConfig};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

/// Command-line arguments for huddle-ce
#[derive(Parser, Debug)]
#[command(name = "huddle-ce")]
#[command(about = "Interest coordination engine for Huddle")]
#[command(version)]
struct Args {
    /// Port to listen on (overrides config file)
    #[arg(short, long, env = "HUDDLE_CE_PORT")]
    port: Option<u16>,

    /// SQLite database path (overrides config file)
    #[arg(short, long, env = "HUDDLE_DB_PATH")]
    database: Option<PathBuf>,

    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "huddle_ce=info,tower_http=info".into()),
        )
        .init();

    let args = Args::parse();

    info!(
        "Starting Huddle Coordination Engine (huddle-ce) v{}",
        env!("CARGO_PKG_VERSION")
    );

    let config_path = args.config.or_else(default_config_file);
    let mut config = EngineConfig::load(config_path.as_deref())
        .context("Failed to load configuration")?;
    if let Some(port) = args.port {
        config.port = port;
    }
    if let Some(database) = args.database {
        config.database_path = database;
    }

    info!("Database path: {}", config.database_path.display());
    info!(
        "Activation threshold: {} (friend scope: {:?})",
        config.activation_threshold, config.friend_scope
    );

    let pool = huddle_common::db::init_database(&config.database_path)
        .await
        .context("Failed to initialize database")?;

    let state = Arc::new(AppState::new(pool, config.clone()));

    // Periodic action-item expiration sweep
    tokio::spawn(actions::run_sweeper(Arc::clone(&state)));

    let app = api::create_router(Arc::clone(&state));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;
    info!("huddle-ce listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
