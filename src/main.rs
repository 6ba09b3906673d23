//! Vigil: a liveness sidecar.
//!
//! This is the application entry point. It initializes tracing, resolves
//! configuration from an optional TOML file and the environment, builds the
//! Axum router and serves it until SIGTERM.

use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use vigil::config::{AppConfig, DEFAULT_LOG_FILTER};
use vigil::http::start_server;
use vigil::memory::CountingAllocator;
use vigil::{create_router, AppState};

#[global_allocator]
static ALLOCATOR: CountingAllocator = CountingAllocator;

/// Vigil: health, readiness and memory metrics over HTTP
#[derive(Parser, Debug)]
#[command(name = "vigil", version, about)]
struct Args {
    /// Optional TOML configuration file; environment variables override it
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level filter (e.g., "vigil=debug,tower_http=info")
    #[arg(short, long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Uptime is measured from here, before anything else runs
    let started_at = std::time::Instant::now();

    let args = Args::parse();

    // Initialize tracing with priority: CLI > env > default
    let log_filter = args
        .log_level
        .or_else(|| std::env::var("RUST_LOG").ok())
        .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string());

    // The log format is part of the configuration, so a bad configuration is
    // reported through a plain text subscriber
    let config = match AppConfig::load(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            init_tracing(&log_filter, false);
            tracing::error!(error = %e, "Invalid configuration");
            std::process::exit(1);
        }
    };
    init_tracing(&log_filter, config.logging.is_json());

    tracing::debug!(
        host = %config.http.host,
        port = config.http.port,
        drain_timeout_secs = ?config.http.drain_timeout_seconds,
        "Loaded configuration"
    );

    let app = create_router(AppState::with_start(config.clone(), started_at));

    if let Err(e) = start_server(app, &config).await {
        tracing::error!(error = %e, "Server failed");
        return Err(e.into());
    }

    Ok(())
}

fn init_tracing(log_filter: &str, json: bool) {
    let registry =
        tracing_subscriber::registry().with(tracing_subscriber::EnvFilter::new(log_filter));
    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}
