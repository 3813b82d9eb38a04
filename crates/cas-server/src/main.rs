//! CAS gateway - HTTP/WebSocket front end for the algebra engine.

use anyhow::Result;
use cas_server::{config, logging, routes, state};
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use config::Config;
use logging::{LogConfig, LogFormat};
use state::AppState;

#[derive(Parser, Debug)]
#[command(name = "cas-server")]
#[command(about = "HTTP/WebSocket gateway for simplifying and solving algebra")]
#[command(version)]
struct Cli {
    /// Path to config file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Override bind address from config
    #[arg(long)]
    host: Option<String>,

    /// Override port from config
    #[arg(short, long)]
    port: Option<u16>,

    /// Allowed CORS origin; repeat for several. Replaces the configured list.
    #[arg(long = "cors-origin", value_name = "ORIGIN")]
    cors_origins: Vec<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Enable debug logging (keepalive ticks stay off)
    #[arg(short, long)]
    debug: bool,

    /// Enable trace logging for everything
    #[arg(long)]
    trace: bool,

    /// Warnings and errors only
    #[arg(short, long)]
    quiet: bool,

    /// Per-target level, e.g. "engine=debug". Targets are prefixed with
    /// "cas::" automatically. Can be repeated.
    #[arg(long = "log", value_name = "TARGET=LEVEL")]
    log_overrides: Vec<String>,

    #[arg(long = "log-format", value_name = "FORMAT", default_value = "text")]
    log_format: LogFormat,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_config = LogConfig::from_cli(
        cli.verbose,
        cli.debug,
        cli.trace,
        cli.quiet,
        cli.log_overrides,
        cli.log_format,
    );
    logging::init(&log_config);

    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    if let Some(host) = cli.host {
        config.host = host;
    }
    if let Some(port) = cli.port {
        config.port = port;
    }
    if !cli.cors_origins.is_empty() {
        config.cors_origins = cli.cors_origins;
    }

    tracing::info!(
        target: "cas::startup",
        "Loaded configuration (port: {}, engine workers: {}, keepalive: {}s)",
        config.port,
        config.engine_max_concurrent,
        config.keepalive_interval_secs
    );

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    let state = Arc::new(AppState::new(config));
    let app = routes::router(state).layer(TraceLayer::new_for_http());

    tracing::info!(target: "cas::startup", "Starting server on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!(target: "cas::startup", "Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(target: "cas::startup", "Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!(target: "cas::startup", "Shutdown requested");
}
