//! Configuration types.
//!
//! This module defines the library configuration structs and the enums used
//! by the command-line front end.

use std::path::PathBuf;
use std::time::Duration;

use clap::ValueEnum;

use crate::config::constants::{
    DB_PATH, DEFAULT_BATCH_SIZE, DEFAULT_CHECK_INTERVAL, DEFAULT_CONNECT_TIMEOUT,
    DEFAULT_DNS_CACHE_TTL, DEFAULT_FIRST_CHECK_DELAY, DEFAULT_MAX_CONCURRENCY,
    DEFAULT_MAX_CONNECTIONS_PER_HOST, DEFAULT_POOL_IDLE_TIMEOUT, DEFAULT_TOTAL_TIMEOUT,
    DEFAULT_USER_AGENT,
};
use crate::error_handling::ConfigError;

/// Logging level for the application.
///
/// Controls the verbosity of log output, from most restrictive (Error) to most
/// verbose (Trace).
#[derive(Clone, Debug, ValueEnum)]
pub enum LogLevel {
    /// Only error messages
    Error,
    /// Error and warning messages
    Warn,
    /// Error, warning, and informational messages
    Info,
    /// All messages except trace
    Debug,
    /// All messages including trace
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(l: LogLevel) -> Self {
        match l {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Log output format.
///
/// - `Plain`: Human-readable format with colors (default)
/// - `Json`: One JSON object per line for machine parsing
#[derive(Clone, Debug, ValueEnum)]
pub enum LogFormat {
    /// Human-readable format with colors (default)
    Plain,
    /// Structured JSON format for machine parsing
    Json,
}

/// Settings consumed by the concurrent checker.
///
/// # Examples
///
/// ```
/// use domain_watch::CheckerConfig;
/// use std::time::Duration;
///
/// let config = CheckerConfig {
///     max_concurrency: 20,
///     total_timeout: Duration::from_secs(5),
///     ..Default::default()
/// };
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct CheckerConfig {
    /// Global cap on probes in flight during a run
    pub max_concurrency: usize,

    /// Targets per scheduling batch
    pub batch_size: usize,

    /// Connect-phase budget (TCP + TLS handshake)
    pub connect_timeout: Duration,

    /// Whole-request budget, redirects included
    pub total_timeout: Duration,

    /// Lifetime of a cached DNS answer
    pub dns_cache_ttl: Duration,

    /// Keep-alive lifetime of an idle pooled connection
    pub pool_idle_timeout: Duration,

    /// Idle pooled connections kept per host
    pub max_connections_per_host: usize,

    /// HTTP User-Agent header value
    pub user_agent: String,

    /// Verify TLS certificates (disable to match a lenient checker)
    pub verify_tls: bool,
}

impl CheckerConfig {
    /// Rejects settings that make a run impossible.
    ///
    /// Called by `Checker::new` so misuse surfaces before any probe starts.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_concurrency == 0 {
            return Err(ConfigError::ZeroConcurrency);
        }
        if self.batch_size == 0 {
            return Err(ConfigError::ZeroBatchSize);
        }
        if self.connect_timeout.is_zero() {
            return Err(ConfigError::ZeroTimeout("connect_timeout"));
        }
        if self.total_timeout.is_zero() {
            return Err(ConfigError::ZeroTimeout("total_timeout"));
        }
        Ok(())
    }
}

impl Default for CheckerConfig {
    fn default() -> Self {
        Self {
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            batch_size: DEFAULT_BATCH_SIZE,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            total_timeout: DEFAULT_TOTAL_TIMEOUT,
            dns_cache_ttl: DEFAULT_DNS_CACHE_TTL,
            pool_idle_timeout: DEFAULT_POOL_IDLE_TIMEOUT,
            max_connections_per_host: DEFAULT_MAX_CONNECTIONS_PER_HOST,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            verify_tls: true,
        }
    }
}

/// Library configuration (no CLI dependencies).
///
/// This is the configuration used by the monitor. It can be constructed
/// programmatically; the binary builds it from command-line flags.
#[derive(Debug, Clone)]
pub struct Config {
    /// Database path (SQLite file)
    pub db_path: PathBuf,

    /// Log level
    pub log_level: LogLevel,

    /// Log format
    pub log_format: LogFormat,

    /// Interval between scheduled check cycles
    pub check_interval: Duration,

    /// Delay before the first scheduled cycle
    pub first_check_delay: Duration,

    /// HTTP status server port (optional, disabled by default)
    pub status_port: Option<u16>,

    /// Webhook URLs that receive transition alerts
    pub webhook_urls: Vec<String>,

    /// Checker settings
    pub checker: CheckerConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DB_PATH),
            log_level: LogLevel::Info,
            log_format: LogFormat::Plain,
            check_interval: DEFAULT_CHECK_INTERVAL,
            first_check_delay: DEFAULT_FIRST_CHECK_DELAY,
            status_port: None,
            webhook_urls: Vec::new(),
            checker: CheckerConfig::default(),
        }
    }
}
