//! HTTP(S) GET probe built on a shared `reqwest::Client`.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;

use super::Probe;
use crate::check::CheckResult;
use crate::config::{CheckerConfig, PROBE_GUARD_GRACE};
use crate::dns::{CachingResolver, DnsCache};
use crate::domain::DomainTarget;
use crate::error_handling::{categorize_reqwest_error, InitializationError, ProbeError};
use crate::initialization::{init_client, init_resolver};

/// Bodies up to this size are drained so the connection can go back to the pool.
const MAX_DRAINED_BODY_BYTES: usize = 64 * 1024;

/// Probes a target with a single GET request.
///
/// The client (and with it the keep-alive pool and the DNS cache) is shared by
/// every probe issued through this value, across runs.
pub struct HttpProbe {
    client: Arc<reqwest::Client>,
    resolver: CachingResolver,
    /// Outer bound on a whole probe, slightly above the client's total timeout
    guard_timeout: Duration,
}

impl HttpProbe {
    /// Builds the DNS resolver, the DNS cache and the HTTP client from `config`.
    ///
    /// # Errors
    ///
    /// Returns `InitializationError` if the HTTP client cannot be built.
    pub fn from_config(config: &CheckerConfig) -> Result<Self, InitializationError> {
        let cache = Arc::new(DnsCache::new(config.dns_cache_ttl));
        let resolver = CachingResolver::new(init_resolver(), cache);
        Self::with_resolver(config, resolver)
    }

    /// Like `from_config`, with a caller-supplied resolver.
    pub fn with_resolver(
        config: &CheckerConfig,
        resolver: CachingResolver,
    ) -> Result<Self, InitializationError> {
        let client = init_client(config, Arc::new(resolver.clone()))?;
        Ok(HttpProbe {
            client,
            resolver,
            guard_timeout: config.total_timeout + PROBE_GUARD_GRACE,
        })
    }

    /// The DNS cache used by this probe's client.
    pub fn dns_cache(&self) -> &Arc<DnsCache> {
        self.resolver.cache()
    }
}

#[async_trait]
impl Probe for HttpProbe {
    async fn probe(&self, target: &DomainTarget) -> CheckResult {
        let url = target.url();
        let start = Instant::now();

        let result = tokio::time::timeout(self.guard_timeout, self.client.get(&url).send()).await;

        let checked = match result {
            Ok(Ok(response)) => {
                let response_time = start.elapsed().as_secs_f64();
                let status_code = response.status().as_u16();
                drain_body(response).await;
                CheckResult::responded(target, status_code, response_time)
            }
            Ok(Err(e)) => {
                log::debug!("Request to {url} failed: {e:?}");
                CheckResult::unreachable(target, categorize_reqwest_error(&e))
            }
            Err(_) => CheckResult::unreachable(target, ProbeError::Timeout),
        };

        log::debug!("{} -> {}", target.name, checked.describe());
        checked
    }

    /// Evicts cached addresses older than the DNS TTL, so hosts dropped from
    /// the registry do not pile up across cycles.
    async fn after_run(&self) {
        let cache = self.resolver.cache();
        let purged = cache.purge_expired().await;
        if purged > 0 {
            log::debug!(
                "Purged {} DNS cache entries older than {}s",
                purged,
                cache.ttl().as_secs()
            );
        }
    }
}

/// Reads a small body to completion so keep-alive can reuse the connection.
///
/// Larger bodies are abandoned; the connection is then closed instead of
/// pooled, which only costs a handshake on the next run.
async fn drain_body(mut response: reqwest::Response) {
    let mut read = 0usize;
    while let Ok(Some(chunk)) = response.chunk().await {
        read += chunk.len();
        if read > MAX_DRAINED_BODY_BYTES {
            break;
        }
    }
}
