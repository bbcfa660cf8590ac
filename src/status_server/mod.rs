//! HTTP status server for the long-running monitor.
//!
//! Provides three endpoints:
//! - `/health` - 200 while the monitor loop is running, 503 otherwise
//! - `/status` - JSON summary of the last check cycle
//! - `/metrics` - Prometheus-compatible metrics
//!
//! The server runs in the background and does not block checking.

mod handlers;
mod types;

use axum::routing::get;
use axum::Router;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use handlers::{health_handler, metrics_handler, status_handler};
pub use types::{CycleSnapshot, HealthResponse, StatusResponse, StatusState};

fn router(state: StatusState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/status", get(status_handler))
        .route("/metrics", get(metrics_handler))
        .with_state(state)
}

/// Creates and starts the status server on `127.0.0.1:port`.
///
/// Returns when `shutdown` fires or the server fails.
pub async fn start_status_server(
    port: u16,
    state: StatusState,
    shutdown: CancellationToken,
) -> Result<(), anyhow::Error> {
    let listener = TcpListener::bind(format!("127.0.0.1:{}", port))
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind status server to port {}: {}", port, e))?;

    log::info!("Status server listening on http://127.0.0.1:{}/", port);
    log::info!("  - Health: http://127.0.0.1:{}/health", port);
    log::info!("  - Status: http://127.0.0.1:{}/status", port);
    log::info!("  - Metrics: http://127.0.0.1:{}/metrics", port);

    serve(listener, state, shutdown).await
}

/// Serves the status endpoints on an already bound listener.
pub async fn serve(
    listener: TcpListener,
    state: StatusState,
    shutdown: CancellationToken,
) -> Result<(), anyhow::Error> {
    axum::serve(listener, router(state))
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
        .map_err(|e| anyhow::anyhow!("Status server error: {}", e))?;

    Ok(())
}
