//! Index-tagged result collection.
//!
//! Every in-flight probe carries the index of its target in the submission
//! order, and its result is written straight into that slot. Completion order
//! therefore never affects the final order, and no sort step is needed.

use chrono::{DateTime, Utc};

use crate::check::{CheckResult, CheckRun};
use crate::domain::{DomainTarget, InvalidTarget};

/// Pre-sized result array for one run.
pub(crate) struct ResultSlots {
    slots: Vec<Option<CheckResult>>,
}

impl ResultSlots {
    pub(crate) fn new(len: usize) -> Self {
        ResultSlots {
            slots: vec![None; len],
        }
    }

    /// Stores the result for the target at `index`.
    ///
    /// A slot is written at most once; a second write is ignored so a target
    /// can never end up with two results.
    pub(crate) fn place(&mut self, index: usize, result: CheckResult) {
        match self.slots.get_mut(index) {
            Some(slot @ None) => *slot = Some(result),
            Some(Some(existing)) => log::warn!(
                "Ignoring duplicate result for {} (slot {index} already holds {})",
                existing.domain,
                existing.describe()
            ),
            None => log::warn!(
                "Ignoring result for {} at out-of-range slot {index}",
                result.domain
            ),
        }
    }

    pub(crate) fn filled(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    /// Produces one result per target, UNKNOWN for every empty slot.
    pub(crate) fn into_results(self, targets: &[DomainTarget]) -> Vec<CheckResult> {
        self.slots
            .into_iter()
            .zip(targets)
            .map(|(slot, target)| slot.unwrap_or_else(|| CheckResult::unknown(target)))
            .collect()
    }
}

/// Assembles the `CheckRun` for a finished (or cancelled) pass.
pub(crate) fn collect(
    requested_at: DateTime<Utc>,
    targets: &[DomainTarget],
    slots: ResultSlots,
    rejected: Vec<InvalidTarget>,
    cancelled: bool,
) -> CheckRun {
    CheckRun {
        requested_at,
        completed_at: Utc::now(),
        results: slots.into_results(targets),
        rejected,
        cancelled,
    }
}
