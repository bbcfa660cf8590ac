//! In-process status store.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::{detect_transitions, StatusStore};
use crate::check::{CheckResult, Status};
use crate::error_handling::StoreError;
use crate::notify::Transition;

/// Keeps the last observed status per domain in memory.
///
/// Counts bulk writes and can be switched into a failing mode, which makes it
/// handy for embedding and for exercising persistence failures.
#[derive(Default)]
pub struct MemoryStore {
    statuses: Mutex<HashMap<String, Status>>,
    bulk_writes: AtomicUsize,
    last_write_len: AtomicUsize,
    unavailable: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with `(domain, status)` pairs.
    pub fn with_statuses<I, S>(statuses: I) -> Self
    where
        I: IntoIterator<Item = (S, Status)>,
        S: Into<String>,
    {
        let map = statuses
            .into_iter()
            .map(|(domain, status)| (domain.into(), status))
            .collect();
        MemoryStore {
            statuses: Mutex::new(map),
            ..Self::default()
        }
    }

    pub async fn status_of(&self, domain: &str) -> Option<Status> {
        self.statuses.lock().await.get(domain).copied()
    }

    /// Number of `bulk_apply` calls received, failed ones included.
    pub fn bulk_writes(&self) -> usize {
        self.bulk_writes.load(Ordering::SeqCst)
    }

    /// Number of results handed to the most recent `bulk_apply`.
    pub fn last_write_len(&self) -> usize {
        self.last_write_len.load(Ordering::SeqCst)
    }

    /// Makes every subsequent call fail with `StoreError::Unavailable`.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("memory store is offline".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl StatusStore for MemoryStore {
    async fn get_previous_statuses(
        &self,
        domains: &[String],
    ) -> Result<HashMap<String, Status>, StoreError> {
        self.check_available()?;
        let statuses = self.statuses.lock().await;
        Ok(domains
            .iter()
            .filter_map(|d| statuses.get(d).map(|s| (d.clone(), *s)))
            .collect())
    }

    async fn bulk_apply(&self, results: &[CheckResult]) -> Result<Vec<Transition>, StoreError> {
        self.bulk_writes.fetch_add(1, Ordering::SeqCst);
        self.last_write_len.store(results.len(), Ordering::SeqCst);
        self.check_available()?;

        let mut statuses = self.statuses.lock().await;
        let transitions = detect_transitions(statuses.clone(), results);
        for result in results {
            if result.status() != Status::Unknown {
                statuses.insert(result.domain.clone(), result.status());
            }
        }
        Ok(transitions)
    }
}
