//! DNS resolver initialization.

use std::sync::Arc;
use std::time::Duration;

use hickory_resolver::config::{ResolverConfig, ResolverOpts};
use hickory_resolver::TokioAsyncResolver;

/// Initializes the upstream DNS resolver used behind the probe's cache.
///
/// Reads the system configuration (`/etc/resolv.conf` on Unix). If that
/// fails, falls back to the default public resolvers. Timeouts are kept short
/// so a dead name server fails the probe quickly instead of eating the whole
/// request budget.
pub fn init_resolver() -> Arc<TokioAsyncResolver> {
    let (config, mut opts) = match hickory_resolver::system_conf::read_system_conf() {
        Ok(system) => system,
        Err(e) => {
            log::warn!("Failed to read system DNS configuration ({e}), using defaults");
            (ResolverConfig::default(), ResolverOpts::default())
        }
    };

    opts.timeout = Duration::from_secs(crate::config::DNS_TIMEOUT_SECS);
    opts.attempts = 2;

    Arc::new(TokioAsyncResolver::tokio(config, opts))
}
