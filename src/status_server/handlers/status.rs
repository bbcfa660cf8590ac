//! JSON health and status handlers.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use std::sync::atomic::Ordering;

use super::super::types::{HealthResponse, StatusResponse, StatusState};

/// Liveness endpoint: 200 while the monitor loop runs, 503 otherwise
pub async fn health_handler(State(state): State<StatusState>) -> Response {
    let running = state.is_running();
    let response = HealthResponse {
        status: if running { "healthy" } else { "stopped" },
        uptime_seconds: state.start_time.elapsed().as_secs_f64(),
        cycles_completed: state.cycles_completed.load(Ordering::SeqCst),
    };
    let code = if running {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (code, Json(response)).into_response()
}

/// JSON status endpoint with the last cycle's summary
pub async fn status_handler(State(state): State<StatusState>) -> Response {
    let response = StatusResponse {
        running: state.is_running(),
        uptime_seconds: state.start_time.elapsed().as_secs_f64(),
        cycles_completed: state.cycles_completed.load(Ordering::SeqCst),
        transitions_total: state.transitions_total.load(Ordering::SeqCst),
        persist_failures: state.persist_failures.load(Ordering::SeqCst),
        last_cycle: state.last_cycle.read().await.clone(),
    };
    (StatusCode::OK, Json(response)).into_response()
}
