//! Status transitions and their human-readable alert text.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::check::{CheckResult, Status};

/// A domain whose status changed between two consecutive checks.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transition {
    pub domain: String,
    pub group: String,
    /// Last stored status; `None` when the domain had never been checked
    pub previous: Option<Status>,
    pub current: Status,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_time: Option<f64>,
    pub checked_at: DateTime<Utc>,
}

impl Transition {
    pub fn from_result(previous: Option<Status>, result: &CheckResult) -> Self {
        Transition {
            domain: result.domain.clone(),
            group: result.group.clone(),
            previous,
            current: result.status(),
            status_code: result.status_code(),
            error: result.error().map(ToString::to_string),
            response_time: result.response_time,
            checked_at: result.checked_at,
        }
    }

    /// True for DOWN -> UP.
    pub fn is_recovery(&self) -> bool {
        self.current == Status::Up
    }

    /// Alert text delivered to recipients.
    pub fn message(&self) -> String {
        let time = self.checked_at.format("%Y-%m-%d %H:%M:%S UTC");
        if self.is_recovery() {
            let code = self
                .status_code
                .map(|c| c.to_string())
                .unwrap_or_else(|| "-".to_string());
            let timing = self
                .response_time
                .map(|t| format!("{t:.2}s"))
                .unwrap_or_else(|| "-".to_string());
            format!(
                "DOMAIN RECOVERED\n\nDomain: {}\nGroup: {}\nStatus: UP ({})\nResponse time: {}\nTime: {}",
                self.domain, self.group, code, timing, time
            )
        } else {
            let error = match (&self.error, self.status_code) {
                (Some(error), _) => error.clone(),
                (None, Some(code)) => format!("HTTP {code}"),
                (None, None) => "Unknown error".to_string(),
            };
            format!(
                "DOMAIN DOWN ALERT\n\nDomain: {}\nGroup: {}\nStatus: DOWN\nError: {}\nTime: {}",
                self.domain, self.group, error, time
            )
        }
    }
}

/// Whether moving from `previous` to `current` is worth an alert.
///
/// DOWN is reported when the domain was UP or had no stored status; UP is
/// reported only when it was DOWN. UNKNOWN never produces an alert.
pub fn is_transition(previous: Option<Status>, current: Status) -> bool {
    matches!(
        (previous, current),
        (None | Some(Status::Up) | Some(Status::Unknown), Status::Down)
            | (Some(Status::Down), Status::Up)
    )
}
