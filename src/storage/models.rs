// storage/models.rs
// Registry records returned by the store

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::check::Status;
use crate::domain::DomainTarget;

/// A registered domain with the last status written for it.
///
/// # Database Schema
///
/// Maps to the `domains` table. `last_checked` is stored as milliseconds since
/// the Unix epoch; `last_status` is `NULL` until the first observed check.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoredDomain {
    pub name: String,
    pub group: String,
    pub last_status: Option<Status>,
    pub last_checked: Option<DateTime<Utc>>,
    pub last_response_time: Option<f64>,
    pub last_status_code: Option<u16>,
    pub last_error: Option<String>,
}

impl StoredDomain {
    pub fn target(&self) -> DomainTarget {
        DomainTarget::new(self.name.clone(), self.group.clone())
    }
}

/// Outcome of a bulk registration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AddReport {
    /// Names newly registered
    pub added: Vec<String>,
    /// Names already registered in the requested group
    pub existing_same_group: Vec<String>,
    /// Names already registered elsewhere, as `(name, existing group)`
    pub existing_other_groups: Vec<(String, String)>,
}

impl AddReport {
    /// Every name that was already registered, in either group.
    pub fn existing(&self) -> impl Iterator<Item = &str> {
        self.existing_same_group
            .iter()
            .map(String::as_str)
            .chain(self.existing_other_groups.iter().map(|(name, _)| name.as_str()))
    }
}

/// Per-group status counts based on the last stored status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct GroupSummary {
    pub total: usize,
    pub up: usize,
    pub down: usize,
    /// Domains never checked
    pub unknown: usize,
}
