//! Correlation demo server.
//!
//! # Architecture Overview
//!
//! ```text
//!   Client Request (Korrelasjonsid?, traceparent?)
//!         │
//!         ▼
//!   ┌──────────────┐   ┌───────────────────┐   ┌──────────────────┐
//!   │ trace context│──▶│ correlation filter│──▶│ span interceptor │──▶ handler
//!   │  (tracing.*) │   │ (header.filter.*) │   │ (header.span_*)  │
//!   └──────────────┘   └───────────────────┘   └──────────────────┘
//!                            │ context store        │ trace extra field
//!                            └──────────┬───────────┘
//!                                       ▼
//!                          GET /correlation → {"context", "span"}
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use request_correlation::config::{
    config_warnings, read_config, validate_config, AppConfig, ConfigError,
};
use request_correlation::lifecycle::{signals, Shutdown};
use request_correlation::observability::logging;
use request_correlation::HttpServer;

#[derive(Parser)]
#[command(name = "correlation-server")]
#[command(about = "Serves the correlation snapshot endpoint", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> request_correlation::Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => read_config(path)?,
        None => AppConfig::default(),
    };

    // Logging is installed before validation runs.
    logging::try_init(&config.observability)?;

    tracing::info!("correlation-server v{} starting", env!("CARGO_PKG_VERSION"));
    if let Some(path) = &cli.config {
        tracing::debug!(path = %path.display(), "Configuration file loaded");
    }

    validate_config(&config).map_err(ConfigError::Validation)?;
    for warning in config_warnings(&config) {
        tracing::warn!("{warning}");
    }

    tracing::info!(
        bind_address = %config.listener.bind_address,
        filter_enabled = config.header.filter.enabled,
        span_interceptor_enabled = config.header.span_interceptor.enabled,
        tracing_enabled = config.tracing.enabled,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(
        address = %listener.local_addr()?,
        "Listening for connections"
    );

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    signals::spawn_signal_handler(shutdown);

    HttpServer::new(config).run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
