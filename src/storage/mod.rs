//! Persistence of the last observed status and change detection.
//!
//! The checker itself is stateless between runs. A `StatusStore` owns the
//! durable "last known status" and turns each run's results into the minimal
//! set of transitions, applying all of them in one bulk write.

mod memory;
mod migrations;
mod models;
mod pool;
mod sqlite;

use std::collections::HashMap;

use async_trait::async_trait;

use crate::check::{CheckResult, Status};
use crate::domain::DomainTarget;
use crate::error_handling::StoreError;
use crate::notify::{is_transition, Transition};

// Re-export public API
pub use memory::MemoryStore;
pub use migrations::run_migrations;
pub use models::{AddReport, GroupSummary, StoredDomain};
pub use pool::init_db_pool_with_path;
pub use sqlite::SqliteStore;

/// Narrow interface to the store of previous statuses.
#[async_trait]
pub trait StatusStore: Send + Sync {
    /// Last stored status for each of `domains`; never-checked domains are absent.
    async fn get_previous_statuses(
        &self,
        domains: &[String],
    ) -> Result<HashMap<String, Status>, StoreError>;

    /// Writes every observed result of one run in a single operation and
    /// returns the transitions it caused, in result order.
    ///
    /// UNKNOWN results leave the stored status untouched.
    async fn bulk_apply(&self, results: &[CheckResult]) -> Result<Vec<Transition>, StoreError>;
}

/// Supplies the targets of a check cycle.
#[async_trait]
pub trait TargetSource: Send + Sync {
    /// Registered targets in a stable order, optionally limited to one group.
    async fn list_targets(&self, group: Option<&str>) -> Result<Vec<DomainTarget>, StoreError>;
}

#[async_trait]
impl TargetSource for SqliteStore {
    async fn list_targets(&self, group: Option<&str>) -> Result<Vec<DomainTarget>, StoreError> {
        SqliteStore::list_targets(self, group).await
    }
}

/// A fixed target list, for callers that keep their own registry.
#[async_trait]
impl TargetSource for Vec<DomainTarget> {
    async fn list_targets(&self, group: Option<&str>) -> Result<Vec<DomainTarget>, StoreError> {
        Ok(self
            .iter()
            .filter(|t| group.map_or(true, |g| t.group == g))
            .cloned()
            .collect())
    }
}

/// Compares `results` against `previous` and returns the alert-worthy changes.
///
/// A domain that appears more than once is compared against its own earlier
/// result, so one run never reports the same change twice.
pub fn detect_transitions(
    mut previous: HashMap<String, Status>,
    results: &[CheckResult],
) -> Vec<Transition> {
    let mut transitions = Vec::new();
    for result in results {
        let current = result.status();
        if current == Status::Unknown {
            continue;
        }
        let before = previous.get(&result.domain).copied();
        if is_transition(before, current) {
            transitions.push(Transition::from_result(before, result));
        }
        previous.insert(result.domain.clone(), current);
    }
    transitions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error_handling::ProbeError;

    fn up(name: &str) -> CheckResult {
        CheckResult::responded(&DomainTarget::ungrouped(name), 200, 0.1)
    }

    fn down(name: &str) -> CheckResult {
        CheckResult::unreachable(&DomainTarget::ungrouped(name), ProbeError::Timeout)
    }

    #[test]
    fn test_detect_transitions_down_and_recovery() {
        let previous = HashMap::from([
            ("a.example".to_string(), Status::Up),
            ("b.example".to_string(), Status::Down),
            ("c.example".to_string(), Status::Up),
        ]);
        let results = vec![down("a.example"), up("b.example"), up("c.example")];

        let transitions = detect_transitions(previous, &results);
        assert_eq!(transitions.len(), 2);
        assert_eq!(transitions[0].domain, "a.example");
        assert_eq!(transitions[0].previous, Some(Status::Up));
        assert_eq!(transitions[0].current, Status::Down);
        assert_eq!(transitions[1].domain, "b.example");
        assert!(transitions[1].is_recovery());
    }

    #[test]
    fn test_detect_transitions_ignores_unknown() {
        let previous = HashMap::from([("a.example".to_string(), Status::Up)]);
        let results = vec![CheckResult::unknown(&DomainTarget::ungrouped("a.example"))];
        assert!(detect_transitions(previous, &results).is_empty());
    }

    #[test]
    fn test_detect_transitions_repeated_domain_reports_once() {
        let results = vec![down("a.example"), down("a.example")];
        assert_eq!(detect_transitions(HashMap::new(), &results).len(), 1);
    }

    #[tokio::test]
    async fn test_identical_runs_emit_nothing_the_second_time() {
        let store = MemoryStore::new();
        let results = vec![up("a.example"), up("b.example"), up("c.example")];

        store.bulk_apply(&results).await.unwrap();
        let second = store.bulk_apply(&results).await.unwrap();
        assert!(second.is_empty());
        assert_eq!(store.bulk_writes(), 2);
    }

    #[tokio::test]
    async fn test_fixed_target_list_filters_by_group() {
        let targets = vec![
            DomainTarget::new("a.example", "Web"),
            DomainTarget::new("b.example", "Api"),
        ];
        let web = TargetSource::list_targets(&targets, Some("Web")).await.unwrap();
        assert_eq!(web, vec![DomainTarget::new("a.example", "Web")]);
        assert_eq!(TargetSource::list_targets(&targets, None).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_memory_store_unavailable() {
        let store = MemoryStore::with_statuses([("a.example", Status::Up)]);
        store.set_unavailable(true);
        assert!(matches!(
            store.bulk_apply(&[down("a.example")]).await,
            Err(StoreError::Unavailable(_))
        ));
        store.set_unavailable(false);
        assert_eq!(store.status_of("a.example").await, Some(Status::Up));
    }
}
