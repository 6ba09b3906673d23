//! HTTP server startup logic.

use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use axum::Router;
use axum_server::Handle;

use crate::config::{AppConfig, ServiceConfig};

use super::shutdown;

/// Server startup error
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Failed to bind server: {0}")]
    Bind(#[from] std::io::Error),

    #[error("Invalid listen address: {0}")]
    Address(String),

    #[error("Failed to install signal handler: {0}")]
    Signal(std::io::Error),
}

/// Resolve the configured host and port into a listen address.
pub fn listen_addr(config: &AppConfig) -> Result<SocketAddr, ServerError> {
    let ip: IpAddr = config
        .http
        .host
        .parse()
        .map_err(|e| ServerError::Address(format!("{}: {}", config.http.host, e)))?;
    Ok(SocketAddr::new(ip, config.http.port))
}

/// Start the HTTP server based on configuration.
///
/// This function blocks until the server has shut down and drained.
pub async fn start_server(app: Router, config: &AppConfig) -> Result<(), ServerError> {
    let addr = listen_addr(config)?;
    let handle = Handle::new();

    let drain_timeout = config.http.drain_timeout_seconds.map(Duration::from_secs);
    shutdown::setup_shutdown_handler(handle.clone(), drain_timeout)
        .map_err(ServerError::Signal)?;

    serve(app, addr, handle, &config.service).await
}

/// Bind `addr` and serve `app` until `handle` is shut down.
///
/// The caller owns `handle`; triggering `graceful_shutdown` on it is the only
/// way to stop the server.
pub async fn serve(
    app: Router,
    addr: SocketAddr,
    handle: Handle,
    service: &ServiceConfig,
) -> Result<(), ServerError> {
    tracing::debug!(%addr, "Binding HTTP listener");
    spawn_startup_logger(handle.clone(), service.clone());

    axum_server::bind(addr)
        .handle(handle)
        .serve(app.into_make_service())
        .await?;

    tracing::info!("HTTP server closed");
    Ok(())
}

/// Log the startup banner once the listener is bound.
fn spawn_startup_logger(handle: Handle, service: ServiceConfig) {
    tokio::spawn(async move {
        let Some(bound) = handle.listening().await else {
            return;
        };
        tracing::info!(addr = %bound, "Server running on port {}", bound.port());
        tracing::info!("Environment: {}", service.environment);
        tracing::info!("Version: {}", service.version);
    });
}
