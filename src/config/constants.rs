//! Configuration constants.
//!
//! Policy defaults for the checker, the monitor loop and the store. Every
//! value here can be overridden through `Config`/`CheckerConfig`.

use std::time::Duration;

/// Maximum number of probes in flight at once across a whole run.
pub const DEFAULT_MAX_CONCURRENCY: usize = 100;
/// Number of targets scheduled together as one batch.
pub const DEFAULT_BATCH_SIZE: usize = 50;

// Probe timeouts
/// Bounds the TCP connect and TLS handshake phase of a probe.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(3);
/// Bounds the whole request, redirects included.
pub const DEFAULT_TOTAL_TIMEOUT: Duration = Duration::from_secs(8);
/// Extra time granted to the outer per-probe guard on top of the total timeout.
///
/// reqwest enforces the total timeout itself; the guard only catches a probe
/// that somehow outlives it.
pub const PROBE_GUARD_GRACE: Duration = Duration::from_secs(2);

// Connection reuse
/// How long a resolved address stays in the DNS cache.
pub const DEFAULT_DNS_CACHE_TTL: Duration = Duration::from_secs(5 * 60);
/// Idle keep-alive connections are dropped from the pool after this long.
pub const DEFAULT_POOL_IDLE_TIMEOUT: Duration = Duration::from_secs(30);
/// Idle pooled connections kept per host.
pub const DEFAULT_MAX_CONNECTIONS_PER_HOST: usize = 10;
/// Maximum number of redirect hops followed by a probe.
pub const MAX_REDIRECT_HOPS: usize = 10;
/// DNS query timeout used by the underlying resolver.
pub const DNS_TIMEOUT_SECS: u64 = 3;

/// User-Agent sent with every probe.
pub const DEFAULT_USER_AGENT: &str = "Domain-Checker-Bot/1.0";

// Monitor schedule
/// Interval between two scheduled check cycles.
pub const DEFAULT_CHECK_INTERVAL: Duration = Duration::from_secs(5 * 60);
/// Delay before the first scheduled cycle after startup.
pub const DEFAULT_FIRST_CHECK_DELAY: Duration = Duration::from_secs(30);

// Alert delivery
/// Per-request timeout for webhook deliveries.
pub const WEBHOOK_TIMEOUT: Duration = Duration::from_secs(10);
/// Backoff base; retry delays are `base^n * ALERT_RETRY_FACTOR` ms (200ms, 400ms, ...).
pub const ALERT_RETRY_BASE_MS: u64 = 2;
pub const ALERT_RETRY_FACTOR: u64 = 100;
/// Cap on any single retry delay.
pub const ALERT_RETRY_MAX_DELAY: Duration = Duration::from_secs(5);
/// Retries after the first failed delivery attempt.
pub const ALERT_RETRY_MAX_ATTEMPTS: usize = 2;

// Storage
pub const DB_PATH: &str = "./domain_watch.db";
/// Group assigned to domains added without an explicit group.
pub const DEFAULT_GROUP: &str = "Default";
/// Rows per multi-row upsert statement inside one bulk write transaction.
///
/// Keeps each statement under SQLite's bound-parameter limit.
pub const BULK_WRITE_CHUNK_ROWS: usize = 500;

/// Maximum length of a stored error diagnostic.
pub const MAX_ERROR_MESSAGE_LENGTH: usize = 500;
/// Maximum accepted length of a domain name as stored (before normalization).
pub const MAX_TARGET_LENGTH: usize = 2048;

// HTTP status policy
/// Lowest status code counted as UP (inclusive).
pub const HTTP_UP_MIN: u16 = 200;
/// Upper bound of the UP range (exclusive).
pub const HTTP_UP_MAX: u16 = 400;
