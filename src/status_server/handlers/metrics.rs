//! Prometheus metrics handler.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::sync::atomic::Ordering;

use super::super::types::StatusState;

/// Prometheus-compatible metrics endpoint
pub async fn metrics_handler(State(state): State<StatusState>) -> Response {
    let cycles = state.cycles_completed.load(Ordering::SeqCst);
    let transitions = state.transitions_total.load(Ordering::SeqCst);
    let persist_failures = state.persist_failures.load(Ordering::SeqCst);
    let running = u8::from(state.is_running());

    let (up, down, unknown, elapsed) = match state.last_cycle.read().await.as_ref() {
        Some(cycle) => (
            cycle.summary.up,
            cycle.summary.down,
            cycle.summary.unknown,
            cycle.summary.elapsed_seconds,
        ),
        None => (0, 0, 0, 0.0),
    };

    let metrics = format!(
        r#"# HELP domain_watch_running Whether the periodic monitor loop is active
# TYPE domain_watch_running gauge
domain_watch_running {}

# HELP domain_watch_cycles_total Number of completed check cycles
# TYPE domain_watch_cycles_total counter
domain_watch_cycles_total {}

# HELP domain_watch_transitions_total Status transitions detected
# TYPE domain_watch_transitions_total counter
domain_watch_transitions_total {}

# HELP domain_watch_persist_failures_total Cycles whose bulk write failed
# TYPE domain_watch_persist_failures_total counter
domain_watch_persist_failures_total {}

# HELP domain_watch_domains Domains by status in the last cycle
# TYPE domain_watch_domains gauge
domain_watch_domains{{status="up"}} {}
domain_watch_domains{{status="down"}} {}
domain_watch_domains{{status="unknown"}} {}

# HELP domain_watch_last_cycle_seconds Duration of the last cycle
# TYPE domain_watch_last_cycle_seconds gauge
domain_watch_last_cycle_seconds {}
"#,
        running, cycles, transitions, persist_failures, up, down, unknown, elapsed
    );

    (StatusCode::OK, metrics).into_response()
}
