//! Batch scheduling of probes.
//!
//! A run validates its targets, splits the accepted ones into sequential
//! batches and dispatches every target of a batch as its own task. A shared
//! semaphore bounds how many probes are in flight at once, across batch
//! boundaries. Results land in submission order regardless of completion
//! order (see `aggregate`).

mod aggregate;

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use futures::stream::{FuturesUnordered, StreamExt};
use log::{debug, info, warn};
use tokio::sync::Semaphore;
use tokio::task::JoinError;
use tokio_util::sync::CancellationToken;

use crate::check::{CheckResult, CheckRun, Status};
use crate::config::CheckerConfig;
use crate::domain::{partition_targets, validate_target, DomainTarget, InvalidTarget};
use crate::error_handling::{ConfigError, InitializationError, ProbeError};
use crate::initialization::init_semaphore;
use crate::probe::{HttpProbe, Probe};

use aggregate::ResultSlots;

/// Runs probes for many targets with bounded concurrency.
///
/// A `Checker` is cheap to share behind an `Arc` and can execute any number of
/// runs; probe state such as the HTTP connection pool and the DNS cache lives
/// in the probe and therefore survives between runs.
pub struct Checker<P: Probe + 'static = HttpProbe> {
    probe: Arc<P>,
    config: CheckerConfig,
    semaphore: Arc<Semaphore>,
}

impl Checker<HttpProbe> {
    /// Builds a checker with the default HTTP probe.
    ///
    /// # Errors
    ///
    /// Returns `InitializationError::ConfigError` for an invalid config and
    /// `InitializationError::HttpClientError` if the HTTP client cannot be built.
    pub fn from_config(config: CheckerConfig) -> Result<Self, InitializationError> {
        config.validate()?;
        let probe = HttpProbe::from_config(&config)?;
        Ok(Self::with_shared_probe(Arc::new(probe), config)?)
    }
}

impl<P: Probe + 'static> Checker<P> {
    /// Builds a checker around `probe`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if `max_concurrency` or `batch_size` is zero, or a
    /// timeout is zero.
    pub fn new(probe: P, config: CheckerConfig) -> Result<Self, ConfigError> {
        Self::with_shared_probe(Arc::new(probe), config)
    }

    /// Like `new`, for a probe that is also used elsewhere.
    pub fn with_shared_probe(probe: Arc<P>, config: CheckerConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let semaphore = init_semaphore(config.max_concurrency);
        Ok(Checker {
            probe,
            config,
            semaphore,
        })
    }

    pub fn probe(&self) -> &Arc<P> {
        &self.probe
    }

    pub fn config(&self) -> &CheckerConfig {
        &self.config
    }

    /// Checks every target once and returns one result per accepted target,
    /// in input order.
    pub async fn run(&self, targets: Vec<DomainTarget>) -> CheckRun {
        self.run_until_cancelled(targets, CancellationToken::new())
            .await
    }

    /// Like `run`, stopping early when `cancel` fires.
    ///
    /// Targets whose probe had not finished when the run was cancelled are
    /// reported as UNKNOWN; in-flight probes are aborted.
    pub async fn run_until_cancelled(
        &self,
        targets: Vec<DomainTarget>,
        cancel: CancellationToken,
    ) -> CheckRun {
        let requested_at = Utc::now();
        let started = Instant::now();
        let (targets, rejected) = partition_targets(targets);

        let total = targets.len();
        let batch_size = self.config.batch_size;
        let batch_count = total.div_ceil(batch_size);
        let mut slots = ResultSlots::new(total);
        let mut cancelled = false;

        for (batch_index, batch) in targets.chunks(batch_size).enumerate() {
            if cancel.is_cancelled() {
                cancelled = true;
                break;
            }
            info!(
                "Processing batch {}/{} ({} domains)",
                batch_index + 1,
                batch_count,
                batch.len()
            );

            let offset = batch_index * batch_size;
            if !self
                .run_batch(batch, offset, &targets, &mut slots, &cancel)
                .await
            {
                cancelled = true;
                break;
            }
            debug!(
                "Batch {}/{} finished ({} of {} results collected)",
                batch_index + 1,
                batch_count,
                slots.filled(),
                total
            );
        }

        self.probe.after_run().await;

        if cancelled {
            warn!(
                "Run cancelled after {:.1}s: {} of {} targets checked",
                started.elapsed().as_secs_f64(),
                slots.filled(),
                total
            );
        }

        let run = aggregate::collect(requested_at, &targets, slots, rejected, cancelled);
        let summary = run.summary();
        info!(
            "Checked {} domains in {:.1}s: {} up, {} down, {} unknown, {} rejected",
            summary.total,
            started.elapsed().as_secs_f64(),
            summary.up,
            summary.down,
            summary.unknown,
            run.rejected.len()
        );
        run
    }

    /// Dispatches one batch and waits for all of its probes.
    ///
    /// Finished probes are collected while later targets wait for a permit.
    /// On cancellation the remaining tasks are aborted, but every probe that
    /// had already completed still lands in its slot.
    ///
    /// Returns `false` if the run was cancelled while the batch was active.
    async fn run_batch(
        &self,
        batch: &[DomainTarget],
        offset: usize,
        targets: &[DomainTarget],
        slots: &mut ResultSlots,
        cancel: &CancellationToken,
    ) -> bool {
        let mut in_flight = FuturesUnordered::new();
        let mut abort_handles = Vec::with_capacity(batch.len());
        let mut pending = batch.iter().enumerate().peekable();

        loop {
            if pending.peek().is_none() && in_flight.is_empty() {
                return true;
            }
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    abort_handles.iter().for_each(tokio::task::AbortHandle::abort);
                    while let Some((index, joined)) = in_flight.next().await {
                        record(targets, slots, index, joined);
                    }
                    return false;
                }
                Some((index, joined)) = in_flight.next(), if !in_flight.is_empty() => {
                    record(targets, slots, index, joined);
                }
                permit = Arc::clone(&self.semaphore).acquire_owned(), if pending.peek().is_some() => {
                    let Ok(permit) = permit else {
                        // Closed semaphore: nothing more can be admitted
                        pending.by_ref().for_each(drop);
                        continue;
                    };
                    let Some((position, target)) = pending.next() else {
                        continue;
                    };
                    let index = offset + position;
                    let probe = Arc::clone(&self.probe);
                    let target = target.clone();
                    let handle = tokio::spawn(async move {
                        let _permit = permit;
                        probe.probe(&target).await
                    });
                    abort_handles.push(handle.abort_handle());
                    in_flight.push(async move { (index, handle.await) });
                }
            }
        }
    }

    /// Checks a single target immediately, outside any batch.
    ///
    /// The probe still takes a concurrency permit, so a manual check never
    /// pushes a concurrent run over its limit.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTarget` if the target fails validation.
    pub async fn check_one(&self, target: &DomainTarget) -> Result<CheckResult, InvalidTarget> {
        validate_target(target)?;
        let Ok(_permit) = self.semaphore.acquire().await else {
            return Ok(CheckResult::unknown(target));
        };
        let result = self.probe.probe(target).await;
        if result.status() == Status::Down {
            debug!("{} is down: {}", target.name, result.describe());
        }
        Ok(result)
    }
}

/// Places a joined probe task into its slot.
///
/// Aborted tasks leave the slot empty (UNKNOWN); a panicked task becomes DOWN.
fn record(
    targets: &[DomainTarget],
    slots: &mut ResultSlots,
    index: usize,
    joined: Result<CheckResult, JoinError>,
) {
    match joined {
        Ok(result) => slots.place(index, result),
        Err(join_error) if join_error.is_cancelled() => {}
        Err(join_error) => {
            let target = &targets[index];
            warn!("Probe task for {} failed: {}", target.name, join_error);
            slots.place(
                index,
                CheckResult::unreachable(target, ProbeError::TaskFailed(join_error.to_string())),
            );
        }
    }
}
