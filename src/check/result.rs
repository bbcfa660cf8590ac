//! Per-target check outcomes.

use chrono::{DateTime, Utc};
use serde::Serialize;
use strum_macros::{AsRefStr, Display, EnumString};

use crate::config::{HTTP_UP_MAX, HTTP_UP_MIN};
use crate::domain::DomainTarget;
use crate::error_handling::ProbeError;

/// Reachability status as stored and compared between runs.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, EnumString, AsRefStr,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Up,
    Down,
    /// The target was never probed in this run (cancellation).
    Unknown,
}

/// Why a target is DOWN.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "cause", rename_all = "snake_case")]
pub enum DownReason {
    /// The server answered, with a status outside the UP range.
    Http {
        /// Status code received
        status_code: u16,
    },
    /// No response was obtained.
    Transport {
        /// What went wrong
        error: ProbeError,
    },
}

/// Classified outcome of one probe.
///
/// UP and HTTP-DOWN always carry a status code; transport-DOWN always carries
/// an error; UNKNOWN carries neither.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Outcome {
    Up { status_code: u16 },
    Down(DownReason),
    Unknown,
}

impl Outcome {
    /// Classifies a received HTTP status code: [200, 400) is UP.
    pub fn from_status_code(status_code: u16) -> Self {
        if (HTTP_UP_MIN..HTTP_UP_MAX).contains(&status_code) {
            Outcome::Up { status_code }
        } else {
            Outcome::Down(DownReason::Http { status_code })
        }
    }

    pub fn from_error(error: ProbeError) -> Self {
        Outcome::Down(DownReason::Transport { error })
    }

    pub fn status(&self) -> Status {
        match self {
            Outcome::Up { .. } => Status::Up,
            Outcome::Down(_) => Status::Down,
            Outcome::Unknown => Status::Unknown,
        }
    }

    pub fn status_code(&self) -> Option<u16> {
        match self {
            Outcome::Up { status_code }
            | Outcome::Down(DownReason::Http { status_code }) => Some(*status_code),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&ProbeError> {
        match self {
            Outcome::Down(DownReason::Transport { error }) => Some(error),
            _ => None,
        }
    }
}

/// Outcome of one probe against one target.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckResult {
    /// `DomainTarget.name` that was probed
    pub domain: String,
    /// Group of the probed target
    pub group: String,
    #[serde(flatten)]
    pub outcome: Outcome,
    /// Seconds until the response headers arrived; only set when a response was received
    pub response_time: Option<f64>,
    /// When the probe completed (or, for UNKNOWN, when the run gave up on it)
    pub checked_at: DateTime<Utc>,
}

impl CheckResult {
    /// Result for a target that answered with `status_code` after `response_time` seconds.
    pub fn responded(target: &DomainTarget, status_code: u16, response_time: f64) -> Self {
        CheckResult {
            domain: target.name.clone(),
            group: target.group.clone(),
            outcome: Outcome::from_status_code(status_code),
            response_time: Some(response_time),
            checked_at: Utc::now(),
        }
    }

    /// Result for a target that could not be reached.
    pub fn unreachable(target: &DomainTarget, error: ProbeError) -> Self {
        CheckResult {
            domain: target.name.clone(),
            group: target.group.clone(),
            outcome: Outcome::from_error(error),
            response_time: None,
            checked_at: Utc::now(),
        }
    }

    /// Placeholder for a target that was never observed.
    pub fn unknown(target: &DomainTarget) -> Self {
        CheckResult {
            domain: target.name.clone(),
            group: target.group.clone(),
            outcome: Outcome::Unknown,
            response_time: None,
            checked_at: Utc::now(),
        }
    }

    pub fn status(&self) -> Status {
        self.outcome.status()
    }

    pub fn status_code(&self) -> Option<u16> {
        self.outcome.status_code()
    }

    pub fn error(&self) -> Option<&ProbeError> {
        self.outcome.error()
    }

    /// One-line human description, e.g. `UP (200, 0.12s)` or `DOWN (timeout)`.
    pub fn describe(&self) -> String {
        let timing = self
            .response_time
            .map(|t| format!(", {t:.2}s"))
            .unwrap_or_default();
        match &self.outcome {
            Outcome::Up { status_code } => format!("UP ({status_code}{timing})"),
            Outcome::Down(DownReason::Http { status_code }) => {
                format!("DOWN (HTTP {status_code}{timing})")
            }
            Outcome::Down(DownReason::Transport { error }) => format!("DOWN ({error})"),
            Outcome::Unknown => "UNKNOWN (not checked)".to_string(),
        }
    }
}
