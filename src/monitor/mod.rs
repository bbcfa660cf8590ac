//! Check cycles: load targets, check them, persist in bulk, alert on changes.
//!
//! `Monitor::check_once` runs one cycle; `Monitor::run_periodic` drives
//! cycles on a fixed interval until shut down. Each tick awaits the previous
//! cycle, so runs never overlap.

use std::sync::Arc;
use std::time::Duration;

use log::{error, info, warn};
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::check::CheckRun;
use crate::error_handling::StoreError;
use crate::notify::{NotificationSink, Transition};
use crate::probe::{HttpProbe, Probe};
use crate::scheduler::Checker;
use crate::status_server::{CycleSnapshot, StatusState};
use crate::storage::{StatusStore, TargetSource};

/// Everything one cycle produced.
#[derive(Debug, Clone)]
pub struct CycleReport {
    /// Group the cycle was limited to, if any
    pub group: Option<String>,
    /// Results, valid even when persistence failed
    pub run: CheckRun,
    /// Transitions detected by the store; empty when persistence failed
    pub transitions: Vec<Transition>,
    /// Set when the bulk write failed; stored statuses are then stale
    pub persist_error: Option<String>,
    /// Recipient deliveries that failed
    pub notify_failures: usize,
}

impl CycleReport {
    pub fn snapshot(&self) -> CycleSnapshot {
        CycleSnapshot {
            completed_at: self.run.completed_at,
            group: self.group.clone(),
            summary: self.run.summary(),
            rejected: self.run.rejected.len(),
            transitions: self.transitions.len(),
            cancelled: self.run.cancelled,
            persist_error: self.persist_error.clone(),
        }
    }
}

/// Ties a checker to its target source, status store and alert sinks.
pub struct Monitor<P: Probe + 'static = HttpProbe> {
    checker: Checker<P>,
    targets: Arc<dyn TargetSource>,
    store: Arc<dyn StatusStore>,
    sinks: Vec<Arc<dyn NotificationSink>>,
    state: StatusState,
}

impl<P: Probe + 'static> Monitor<P> {
    pub fn new(
        checker: Checker<P>,
        targets: Arc<dyn TargetSource>,
        store: Arc<dyn StatusStore>,
    ) -> Self {
        Monitor {
            checker,
            targets,
            store,
            sinks: Vec::new(),
            state: StatusState::new(),
        }
    }

    /// Adds a sink that receives every transition.
    pub fn with_sink(mut self, sink: Arc<dyn NotificationSink>) -> Self {
        self.sinks.push(sink);
        self
    }

    /// Shares `state` with a status server.
    pub fn with_state(mut self, state: StatusState) -> Self {
        self.state = state;
        self
    }

    pub fn checker(&self) -> &Checker<P> {
        &self.checker
    }

    pub fn state(&self) -> &StatusState {
        &self.state
    }

    /// Runs one full cycle, optionally limited to `group`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` only if the targets cannot be loaded. A failed
    /// bulk write is reported in `CycleReport::persist_error` instead.
    pub async fn check_once(
        &self,
        group: Option<&str>,
        cancel: CancellationToken,
    ) -> Result<CycleReport, StoreError> {
        let targets = self.targets.list_targets(group).await?;
        match group {
            Some(group) => info!("Checking {} domains in group {}", targets.len(), group),
            None => info!("Checking {} domains", targets.len()),
        }

        let run = self.checker.run_until_cancelled(targets, cancel).await;

        let (transitions, persist_error) = if run.results.is_empty() {
            (Vec::new(), None)
        } else {
            match self.store.bulk_apply(&run.results).await {
                Ok(transitions) => (transitions, None),
                Err(e) => {
                    warn!("Failed to persist check results, stored statuses are stale: {e}");
                    (Vec::new(), Some(e.to_string()))
                }
            }
        };

        let notify_failures = self.notify(&transitions).await;

        let report = CycleReport {
            group: group.map(str::to_string),
            run,
            transitions,
            persist_error,
            notify_failures,
        };
        self.state.record_cycle(report.snapshot()).await;
        Ok(report)
    }

    async fn notify(&self, transitions: &[Transition]) -> usize {
        if transitions.is_empty() {
            return 0;
        }
        let mut failures = 0;
        for transition in transitions {
            for sink in &self.sinks {
                failures += sink.notify(transition).await.len();
            }
        }
        info!(
            "Sent {} transition alerts ({} delivery failures)",
            transitions.len(),
            failures
        );
        failures
    }

    /// Runs a cycle every `interval`, the first one after `first_delay`,
    /// until `shutdown` fires. Shutdown cancels the cycle in progress.
    pub async fn run_periodic(
        &self,
        interval: Duration,
        first_delay: Duration,
        shutdown: CancellationToken,
    ) {
        self.state.set_running(true);
        info!(
            "Periodic checks every {}s, first in {}s",
            interval.as_secs(),
            first_delay.as_secs()
        );

        // interval_at panics on a zero period
        let interval = interval.max(Duration::from_secs(1));
        let mut ticker =
            tokio::time::interval_at(tokio::time::Instant::now() + first_delay, interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = ticker.tick() => {}
            }

            match self.check_once(None, shutdown.child_token()).await {
                Ok(report) => {
                    if report.run.cancelled {
                        break;
                    }
                }
                Err(e) => error!("Scheduled check failed to load domains: {e}"),
            }
        }

        self.state.set_running(false);
        info!("Periodic checks stopped");
    }
}
