//! Graceful shutdown and signal handling.
//!
//! SIGTERM stops the listener and drains in-flight connections. Only SIGTERM is
//! handled on Unix; other platforms fall back to Ctrl+C.

use std::time::Duration;

use axum_server::Handle;

/// Install the termination signal handler for `handle`.
///
/// The signal stream is registered before returning so a SIGTERM delivered
/// right after startup is not lost. When the signal arrives, the server will:
/// 1. Stop accepting new connections
/// 2. Wait for existing connections to complete (bounded by `drain_timeout`
///    if set, otherwise indefinitely)
/// 3. Shutdown gracefully
pub fn setup_shutdown_handler(
    handle: Handle,
    drain_timeout: Option<Duration>,
) -> std::io::Result<()> {
    #[cfg(unix)]
    let mut terminate =
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())?;

    tokio::spawn(async move {
        #[cfg(unix)]
        let received = terminate.recv().await.is_some();

        #[cfg(not(unix))]
        let received = tokio::signal::ctrl_c().await.is_ok();

        if !received {
            tracing::error!("Termination signal listener closed, graceful shutdown disabled");
            return;
        }

        tracing::info!("SIGTERM signal received: closing HTTP server");
        begin_drain(&handle, drain_timeout);
    });

    Ok(())
}

/// Stop accepting connections on `handle` and start draining the open ones.
pub fn begin_drain(handle: &Handle, drain_timeout: Option<Duration>) {
    handle.graceful_shutdown(drain_timeout);

    let connections = handle.connection_count();
    match drain_timeout {
        Some(timeout) => tracing::info!(
            connections,
            timeout_secs = timeout.as_secs(),
            "Graceful shutdown initiated, waiting up to {} seconds for connections to close",
            timeout.as_secs()
        ),
        None => tracing::info!(
            connections,
            "Graceful shutdown initiated, waiting for connections to close"
        ),
    }
}
