//! Error type definitions.
//!
//! Library-level errors are `thiserror` enums. `ProbeError` is special: it is
//! never returned from a probe or a run, it is carried as a value inside a
//! `DOWN` check result.

use log::SetLoggerError;
use reqwest::Error as ReqwestError;
use serde::Serialize;
use strum_macros::EnumIter as EnumIterMacro;
use thiserror::Error;

/// Fatal misuse of the checker configuration, raised before any probing.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// `max_concurrency` must admit at least one probe.
    #[error("max_concurrency must be greater than zero")]
    ZeroConcurrency,

    /// `batch_size` must hold at least one target.
    #[error("batch_size must be greater than zero")]
    ZeroBatchSize,

    /// A timeout budget of zero would fail every probe.
    #[error("{0} must be greater than zero")]
    ZeroTimeout(&'static str),
}

/// Error types for initialization failures.
#[derive(Error, Debug)]
#[allow(clippy::enum_variant_names)] // All variants end with "Error" by convention
pub enum InitializationError {
    /// Error initializing the logger.
    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] SetLoggerError),

    /// Error initializing the HTTP client.
    #[error("HTTP client initialization error: {0}")]
    HttpClientError(#[from] ReqwestError),

    /// Invalid checker configuration.
    #[error("Configuration error: {0}")]
    ConfigError(#[from] ConfigError),
}

/// Error types for status store operations.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Error creating the database file.
    #[error("Database file creation error: {0}")]
    FileCreationError(String),

    /// SQL execution error.
    #[error("SQL error: {0}")]
    SqlError(#[from] sqlx::Error),

    /// Schema migration error.
    #[error("Migration error: {0}")]
    MigrationError(#[from] sqlx::migrate::MigrateError),

    /// A stored value could not be decoded.
    #[error("Corrupt stored value for {domain}: {detail}")]
    CorruptValue {
        /// Domain whose row holds the bad value
        domain: String,
        /// What was wrong with it
        detail: String,
    },

    /// The store rejected the write (used by in-memory stores and tests).
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Error types for alert delivery.
#[derive(Error, Debug)]
pub enum NotifyError {
    /// Transport failure talking to a recipient.
    #[error("Failed to deliver alert to {recipient}: {source}")]
    Delivery {
        /// Recipient the alert was addressed to
        recipient: String,
        /// Underlying HTTP error
        #[source]
        source: ReqwestError,
    },

    /// Recipient answered with a non-success status.
    #[error("Recipient {recipient} rejected alert with HTTP {status}")]
    Rejected {
        /// Recipient the alert was addressed to
        recipient: String,
        /// Status code returned
        status: u16,
    },
}

/// Transport-level reason a probe observed a domain as unreachable.
///
/// The `Display` form is the short diagnostic stored as `error`.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum ProbeError {
    /// Connect or total budget exceeded.
    #[error("timeout")]
    Timeout,

    /// Host name could not be resolved.
    #[error("DNS failure: {0}")]
    Dns(String),

    /// The peer actively refused the TCP connection.
    #[error("connection refused")]
    ConnectionRefused,

    /// TLS handshake or certificate validation failed.
    #[error("SSL error: {0}")]
    Tls(String),

    /// Any other failure while establishing the connection.
    #[error("connection error: {0}")]
    Connect(String),

    /// Failure after the connection was up (reset, protocol error, redirect loop).
    #[error("request error: {0}")]
    Request(String),

    /// The normalized target could not be turned into a request.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// The probe task itself died (panicked) before producing a result.
    #[error("probe task failed: {0}")]
    TaskFailed(String),
}

/// Coarse category of a `ProbeError`, used for run statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, EnumIterMacro)]
pub enum ErrorKind {
    Timeout,
    Dns,
    ConnectionRefused,
    Tls,
    Connect,
    Request,
    InvalidUrl,
    TaskFailed,
}

impl ProbeError {
    /// Returns the category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ProbeError::Timeout => ErrorKind::Timeout,
            ProbeError::Dns(_) => ErrorKind::Dns,
            ProbeError::ConnectionRefused => ErrorKind::ConnectionRefused,
            ProbeError::Tls(_) => ErrorKind::Tls,
            ProbeError::Connect(_) => ErrorKind::Connect,
            ProbeError::Request(_) => ErrorKind::Request,
            ProbeError::InvalidUrl(_) => ErrorKind::InvalidUrl,
            ProbeError::TaskFailed(_) => ErrorKind::TaskFailed,
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Timeout => "timeout",
            ErrorKind::Dns => "dns",
            ErrorKind::ConnectionRefused => "connection_refused",
            ErrorKind::Tls => "tls",
            ErrorKind::Connect => "connect",
            ErrorKind::Request => "request",
            ErrorKind::InvalidUrl => "invalid_url",
            ErrorKind::TaskFailed => "task_failed",
        }
    }
}
