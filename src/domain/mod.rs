//! Monitored targets and their normalization.
//!
//! A `DomainTarget` is the bare or schemed host name exactly as stored. Before
//! a probe it is normalized by prefixing `https://` when no scheme is present;
//! nothing else about the string is changed.

use serde::{Deserialize, Serialize};

use crate::config::{DEFAULT_GROUP, MAX_TARGET_LENGTH};

/// One monitored endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DomainTarget {
    /// Host name as stored, with or without scheme. Unique in the monitoring set.
    pub name: String,
    /// Organizational label; never affects probing.
    pub group: String,
}

impl DomainTarget {
    pub fn new(name: impl Into<String>, group: impl Into<String>) -> Self {
        DomainTarget {
            name: name.into(),
            group: group.into(),
        }
    }

    /// Creates a target in the default group.
    pub fn ungrouped(name: impl Into<String>) -> Self {
        Self::new(name, DEFAULT_GROUP)
    }

    /// Returns the URL a probe should request for this target.
    pub fn url(&self) -> String {
        normalize_target(&self.name)
    }
}

/// Why a target was excluded from a run before scheduling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum InvalidTarget {
    /// The stored name is empty or whitespace.
    #[error("empty domain name (group {group})")]
    EmptyName {
        /// Group the empty entry was filed under
        group: String,
    },

    /// The stored name exceeds the accepted length.
    #[error("domain name too long ({length} characters): {prefix}...")]
    TooLong {
        /// First characters of the rejected name
        prefix: String,
        /// Full length of the name
        length: usize,
    },

    /// The normalized name is not a valid http(s) URL.
    #[error("invalid domain {name}: {detail}")]
    Malformed {
        /// Name as stored
        name: String,
        /// Parser's explanation
        detail: String,
    },
}

/// Adds `https://` when `name` has no http(s) scheme.
///
/// # Examples
///
/// ```
/// use domain_watch::normalize_target;
///
/// assert_eq!(normalize_target("example.com"), "https://example.com");
/// assert_eq!(normalize_target("http://example.com"), "http://example.com");
/// ```
pub fn normalize_target(name: &str) -> String {
    match explicit_scheme(name) {
        Some(scheme) if is_http_scheme(scheme) => name.to_string(),
        _ => format!("https://{name}"),
    }
}

/// Scheme written before `://`, if any.
fn explicit_scheme(name: &str) -> Option<&str> {
    name.split_once("://").map(|(scheme, _)| scheme)
}

fn is_http_scheme(scheme: &str) -> bool {
    scheme.eq_ignore_ascii_case("http") || scheme.eq_ignore_ascii_case("https")
}

/// Checks a single target: non-empty, bounded length, and a parseable http(s)
/// URL after normalization.
pub fn validate_target(target: &DomainTarget) -> Result<(), InvalidTarget> {
    if target.name.trim().is_empty() {
        return Err(InvalidTarget::EmptyName {
            group: target.group.clone(),
        });
    }
    if target.name.len() > MAX_TARGET_LENGTH {
        return Err(InvalidTarget::TooLong {
            prefix: target.name.chars().take(50).collect(),
            length: target.name.len(),
        });
    }

    if let Some(scheme) = explicit_scheme(&target.name).filter(|s| !is_http_scheme(s)) {
        return Err(InvalidTarget::Malformed {
            name: target.name.clone(),
            detail: format!("unsupported scheme {scheme}"),
        });
    }

    let normalized = normalize_target(&target.name);
    match url::Url::parse(&normalized) {
        Ok(parsed) if parsed.host_str().is_some_and(|h| !h.is_empty()) => Ok(()),
        Ok(_) => Err(InvalidTarget::Malformed {
            name: target.name.clone(),
            detail: "missing host".to_string(),
        }),
        Err(e) => Err(InvalidTarget::Malformed {
            name: target.name.clone(),
            detail: e.to_string(),
        }),
    }
}

/// Splits `targets` into the ones that may be scheduled (order preserved) and
/// the ones rejected as input-validation failures.
pub fn partition_targets(targets: Vec<DomainTarget>) -> (Vec<DomainTarget>, Vec<InvalidTarget>) {
    let mut valid = Vec::with_capacity(targets.len());
    let mut rejected = Vec::new();
    for target in targets {
        match validate_target(&target) {
            Ok(()) => valid.push(target),
            Err(reason) => {
                log::warn!("Skipping target: {reason}");
                rejected.push(reason);
            }
        }
    }
    (valid, rejected)
}

/// Splits a comma/whitespace separated list of names, as typed by an operator
/// or read from a file. `#` starts a comment that runs to the end of the line.
pub fn parse_domain_list(input: &str) -> Vec<String> {
    input
        .lines()
        .map(|line| line.split_once('#').map_or(line, |(before, _)| before))
        .flat_map(|line| line.split(|c: char| c == ',' || c.is_whitespace()))
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
