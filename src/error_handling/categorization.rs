//! Transport error categorization and alert retry strategy.
//!
//! Maps a `reqwest::Error` onto the `ProbeError` taxonomy by inspecting the
//! reqwest error flags first and then walking the source chain for the
//! concrete cause (resolver error, refused socket, rustls alert).

use std::error::Error as StdError;
use std::io::ErrorKind as IoErrorKind;
use std::time::Duration;

use tokio_retry::strategy::ExponentialBackoff;

use super::types::ProbeError;
use crate::dns::DnsLookupError;

/// Creates the exponential backoff used to redeliver alerts.
///
/// Probes are never retried: a failed probe is the observation. Only alert
/// deliveries that failed in transport go through this strategy.
pub fn alert_retry_strategy() -> impl Iterator<Item = Duration> {
    ExponentialBackoff::from_millis(crate::config::ALERT_RETRY_BASE_MS)
        .factor(crate::config::ALERT_RETRY_FACTOR)
        .max_delay(crate::config::ALERT_RETRY_MAX_DELAY)
        .take(crate::config::ALERT_RETRY_MAX_ATTEMPTS)
}

/// Categorizes a `reqwest::Error` into a `ProbeError`.
///
/// Timeouts win over everything else: reqwest marks both connect-phase and
/// total-request timeouts with `is_timeout()`.
pub fn categorize_reqwest_error(error: &reqwest::Error) -> ProbeError {
    if error.is_timeout() {
        return ProbeError::Timeout;
    }
    if error.is_builder() {
        return ProbeError::InvalidUrl(root_cause_message(error));
    }
    if let Some(found) = classify_source_chain(error) {
        return found;
    }

    let message = root_cause_message(error);
    if error.is_connect() {
        classify_by_message(&message).unwrap_or(ProbeError::Connect(message))
    } else if error.is_redirect() {
        ProbeError::Request("too many redirects".to_string())
    } else {
        classify_by_message(&message).unwrap_or(ProbeError::Request(message))
    }
}

/// Walks an error's source chain looking for a cause we can name precisely.
///
/// `std::io::Error::source` skips over a custom inner error, so the inner
/// error is inspected explicitly through `get_ref`.
fn classify_source_chain(error: &(dyn StdError + 'static)) -> Option<ProbeError> {
    let mut current: Option<&(dyn StdError + 'static)> = Some(error);
    while let Some(err) = current {
        if let Some(dns) = err.downcast_ref::<DnsLookupError>() {
            return Some(ProbeError::Dns(dns.reason.clone()));
        }
        if let Some(tls) = err.downcast_ref::<rustls::Error>() {
            return Some(ProbeError::Tls(tls.to_string()));
        }
        if let Some(io) = err.downcast_ref::<std::io::Error>() {
            match io.kind() {
                IoErrorKind::ConnectionRefused => return Some(ProbeError::ConnectionRefused),
                IoErrorKind::TimedOut => return Some(ProbeError::Timeout),
                _ => {}
            }
            if let Some(inner) = io.get_ref() {
                let inner: &(dyn StdError + 'static) = inner;
                if let Some(found) = classify_source_chain(inner) {
                    return Some(found);
                }
            }
        }
        current = err.source();
    }
    None
}

/// Last-resort classification on the rendered message.
fn classify_by_message(message: &str) -> Option<ProbeError> {
    let lower = message.to_lowercase();
    if lower.contains("connection refused") {
        Some(ProbeError::ConnectionRefused)
    } else if lower.contains("dns error") || lower.contains("failed to lookup address") {
        Some(ProbeError::Dns(message.to_string()))
    } else if lower.contains("certificate")
        || lower.contains("tls")
        || lower.contains("ssl")
        || lower.contains("handshake")
    {
        Some(ProbeError::Tls(message.to_string()))
    } else {
        None
    }
}

/// Renders the innermost error of a chain, which carries the useful detail.
fn root_cause_message(error: &(dyn StdError + 'static)) -> String {
    let mut last: &(dyn StdError + 'static) = error;
    while let Some(next) = last.source() {
        last = next;
    }
    truncate_message(&last.to_string())
}

/// Caps a diagnostic at `MAX_ERROR_MESSAGE_LENGTH` characters.
pub fn truncate_message(message: &str) -> String {
    let max = crate::config::MAX_ERROR_MESSAGE_LENGTH;
    if message.chars().count() <= max {
        message.to_string()
    } else {
        let truncated: String = message.chars().take(max).collect();
        format!("{truncated}...")
    }
}
