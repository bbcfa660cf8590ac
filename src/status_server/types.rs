//! Status server data structures.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::RwLock;

use crate::check::RunSummary;

/// Shared state between the monitor loop and the status server
#[derive(Clone)]
pub struct StatusState {
    pub start_time: Arc<Instant>,
    /// Set while the periodic loop is active
    pub running: Arc<AtomicBool>,
    pub cycles_completed: Arc<AtomicUsize>,
    pub transitions_total: Arc<AtomicUsize>,
    /// Cycles whose bulk write failed
    pub persist_failures: Arc<AtomicUsize>,
    pub last_cycle: Arc<RwLock<Option<CycleSnapshot>>>,
}

impl StatusState {
    pub fn new() -> Self {
        StatusState {
            start_time: Arc::new(Instant::now()),
            running: Arc::new(AtomicBool::new(false)),
            cycles_completed: Arc::new(AtomicUsize::new(0)),
            transitions_total: Arc::new(AtomicUsize::new(0)),
            persist_failures: Arc::new(AtomicUsize::new(0)),
            last_cycle: Arc::new(RwLock::new(None)),
        }
    }

    pub fn set_running(&self, running: bool) {
        self.running.store(running, Ordering::SeqCst);
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Records a finished cycle.
    pub async fn record_cycle(&self, snapshot: CycleSnapshot) {
        self.cycles_completed.fetch_add(1, Ordering::SeqCst);
        self.transitions_total
            .fetch_add(snapshot.transitions, Ordering::SeqCst);
        if snapshot.persist_error.is_some() {
            self.persist_failures.fetch_add(1, Ordering::SeqCst);
        }
        *self.last_cycle.write().await = Some(snapshot);
    }
}

impl Default for StatusState {
    fn default() -> Self {
        Self::new()
    }
}

/// Condensed view of one check cycle
#[derive(Debug, Clone, Serialize)]
pub struct CycleSnapshot {
    pub completed_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    pub summary: RunSummary,
    pub rejected: usize,
    pub transitions: usize,
    pub cancelled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub persist_error: Option<String>,
}

/// JSON response for `/health` endpoint
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub uptime_seconds: f64,
    pub cycles_completed: usize,
}

/// JSON response for `/status` endpoint
#[derive(Serialize)]
pub struct StatusResponse {
    pub running: bool,
    pub uptime_seconds: f64,
    pub cycles_completed: usize,
    pub transitions_total: usize,
    pub persist_failures: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_cycle: Option<CycleSnapshot>,
}
