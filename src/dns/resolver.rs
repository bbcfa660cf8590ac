//! Caching DNS resolver for reqwest.
//!
//! Implements `reqwest::dns::Resolve` on top of `hickory-resolver`, consulting
//! the shared `DnsCache` first. Resolution failures are returned as
//! `DnsLookupError` so the probe can classify them as DNS failures.

use std::net::SocketAddr;
use std::sync::Arc;

use hickory_resolver::TokioAsyncResolver;
use reqwest::dns::{Addrs, Name, Resolve, Resolving};

use super::cache::DnsCache;

/// A host name could not be resolved to any address.
#[derive(Debug, Clone, thiserror::Error)]
#[error("failed to resolve {host}: {reason}")]
pub struct DnsLookupError {
    /// Host that was looked up
    pub host: String,
    /// Resolver's explanation
    pub reason: String,
}

/// reqwest resolver backed by hickory with a TTL cache in front.
#[derive(Clone)]
pub struct CachingResolver {
    resolver: Arc<TokioAsyncResolver>,
    cache: Arc<DnsCache>,
}

impl CachingResolver {
    pub fn new(resolver: Arc<TokioAsyncResolver>, cache: Arc<DnsCache>) -> Self {
        CachingResolver { resolver, cache }
    }

    /// The cache shared by this resolver, for inspection and purging.
    pub fn cache(&self) -> &Arc<DnsCache> {
        &self.cache
    }
}

impl Resolve for CachingResolver {
    fn resolve(&self, name: Name) -> Resolving {
        let resolver = Arc::clone(&self.resolver);
        let cache = Arc::clone(&self.cache);
        Box::pin(async move {
            let host = name.as_str().to_string();

            if let Some(addrs) = cache.get(&host).await {
                log::trace!("DNS cache hit for {host}");
                let addrs: Addrs =
                    Box::new(addrs.into_iter().map(|ip| SocketAddr::new(ip, 0)));
                return Ok(addrs);
            }

            let lookup = resolver.lookup_ip(host.as_str()).await.map_err(|e| {
                Box::new(DnsLookupError {
                    host: host.clone(),
                    reason: e.to_string(),
                }) as Box<dyn std::error::Error + Send + Sync>
            })?;

            let ips: Vec<_> = lookup.iter().collect();
            if ips.is_empty() {
                return Err(Box::new(DnsLookupError {
                    host: host.clone(),
                    reason: "no addresses returned".to_string(),
                }) as Box<dyn std::error::Error + Send + Sync>);
            }

            log::trace!("Resolved {host} to {} address(es)", ips.len());
            cache.insert(&host, ips.clone()).await;

            let addrs: Addrs = Box::new(ips.into_iter().map(|ip| SocketAddr::new(ip, 0)));
            Ok(addrs)
        })
    }
}
