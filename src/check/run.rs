//! Aggregate of one full check pass.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::result::{CheckResult, DownReason, Outcome};
use crate::domain::InvalidTarget;

/// Results of one run, in the same order and cardinality as the scheduled
/// targets.
#[derive(Debug, Clone, Serialize)]
pub struct CheckRun {
    pub requested_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    /// One entry per scheduled target, in submission order
    pub results: Vec<CheckResult>,
    /// Targets excluded before scheduling
    pub rejected: Vec<InvalidTarget>,
    /// Whether the run was cut short by cancellation
    pub cancelled: bool,
}

impl CheckRun {
    pub fn summary(&self) -> RunSummary {
        RunSummary::from_results(&self.results, self.elapsed_seconds())
    }

    pub fn elapsed_seconds(&self) -> f64 {
        (self.completed_at - self.requested_at)
            .to_std()
            .map(|d| d.as_secs_f64())
            .unwrap_or(0.0)
    }

    /// Results that are DOWN, in order.
    pub fn down(&self) -> impl Iterator<Item = &CheckResult> {
        self.results
            .iter()
            .filter(|r| matches!(r.outcome, Outcome::Down(_)))
    }
}

/// Counts describing one run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunSummary {
    pub total: usize,
    pub up: usize,
    pub down: usize,
    pub unknown: usize,
    /// DOWN results that did receive a response, by status code
    pub http_errors: BTreeMap<u16, usize>,
    /// DOWN results without a response, by error category
    pub transport_errors: BTreeMap<String, usize>,
    pub elapsed_seconds: f64,
}

impl RunSummary {
    pub fn from_results(results: &[CheckResult], elapsed_seconds: f64) -> Self {
        let mut summary = RunSummary {
            total: results.len(),
            elapsed_seconds,
            ..Default::default()
        };
        for result in results {
            match &result.outcome {
                Outcome::Up { .. } => summary.up += 1,
                Outcome::Down(DownReason::Http { status_code }) => {
                    summary.down += 1;
                    *summary.http_errors.entry(*status_code).or_default() += 1;
                }
                Outcome::Down(DownReason::Transport { error }) => {
                    summary.down += 1;
                    *summary
                        .transport_errors
                        .entry(error.kind().to_string())
                        .or_default() += 1;
                }
                Outcome::Unknown => summary.unknown += 1,
            }
        }
        summary
    }
}
