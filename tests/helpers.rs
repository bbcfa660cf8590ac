// Shared test helpers: instrumented probes, configs and a local HTTP setup.
//
// This module provides common utilities used across multiple test files to reduce duplication.

use std::collections::HashMap;
use std::net::{IpAddr, Ipv4Addr};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use domain_watch::dns::{CachingResolver, DnsCache};
use domain_watch::initialization::init_resolver;
use domain_watch::{CheckResult, CheckerConfig, DomainTarget, HttpProbe, Probe, ProbeError};

/// Checker settings with short timeouts for local servers.
#[allow(dead_code)] // Used by other test files
pub fn test_config(max_concurrency: usize, batch_size: usize) -> CheckerConfig {
    CheckerConfig {
        max_concurrency,
        batch_size,
        connect_timeout: Duration::from_secs(1),
        total_timeout: Duration::from_secs(1),
        user_agent: "domain_watch_test/1.0".to_string(),
        ..CheckerConfig::default()
    }
}

/// `count` targets named `host{i}.test` in the default group.
#[allow(dead_code)]
pub fn numbered_targets(count: usize) -> Vec<DomainTarget> {
    (0..count)
        .map(|i| DomainTarget::ungrouped(format!("host{i}.test")))
        .collect()
}

/// Probe that sleeps for a per-target latency and records how many probes
/// are active at once.
#[allow(dead_code)]
pub struct InstrumentedProbe {
    latencies: HashMap<String, Duration>,
    default_latency: Duration,
    active: AtomicUsize,
    pub max_active: AtomicUsize,
    pub started: AtomicUsize,
    pub finished: AtomicUsize,
}

#[allow(dead_code)]
impl InstrumentedProbe {
    pub fn uniform(latency: Duration) -> Self {
        Self::with_latencies(HashMap::new(), latency)
    }

    pub fn with_latencies(latencies: HashMap<String, Duration>, default_latency: Duration) -> Self {
        InstrumentedProbe {
            latencies,
            default_latency,
            active: AtomicUsize::new(0),
            max_active: AtomicUsize::new(0),
            started: AtomicUsize::new(0),
            finished: AtomicUsize::new(0),
        }
    }

    pub fn max_active(&self) -> usize {
        self.max_active.load(Ordering::SeqCst)
    }

    pub fn started(&self) -> usize {
        self.started.load(Ordering::SeqCst)
    }

    /// Probes that ran to completion and returned a result.
    pub fn finished(&self) -> usize {
        self.finished.load(Ordering::SeqCst)
    }
}

/// Decrements the active counter even when the probe is aborted mid-sleep.
struct ActiveGuard<'a>(&'a AtomicUsize);

impl Drop for ActiveGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl Probe for InstrumentedProbe {
    async fn probe(&self, target: &DomainTarget) -> CheckResult {
        self.started.fetch_add(1, Ordering::SeqCst);
        let now_active = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_active.fetch_max(now_active, Ordering::SeqCst);
        let _guard = ActiveGuard(&self.active);

        let latency = self
            .latencies
            .get(&target.name)
            .copied()
            .unwrap_or(self.default_latency);
        tokio::time::sleep(latency).await;

        // No await after this point, so a counted probe always returns
        self.finished.fetch_add(1, Ordering::SeqCst);
        if target.name.starts_with("down") {
            CheckResult::unreachable(target, ProbeError::ConnectionRefused)
        } else {
            CheckResult::responded(target, 200, latency.as_secs_f64())
        }
    }
}

/// Builds an HTTP probe whose DNS cache maps each of `hosts` to 127.0.0.1,
/// so named targets can be served by a local mock server.
#[allow(dead_code)]
pub async fn local_http_probe(config: &CheckerConfig, hosts: &[&str]) -> HttpProbe {
    let cache = Arc::new(DnsCache::new(Duration::from_secs(3600)));
    for host in hosts {
        cache
            .insert(host, vec![IpAddr::V4(Ipv4Addr::LOCALHOST)])
            .await;
    }
    let resolver = CachingResolver::new(init_resolver(), cache);
    HttpProbe::with_resolver(config, resolver).expect("Failed to build HTTP probe")
}

/// A local port with nothing listening on it.
#[allow(dead_code)]
pub fn closed_port() -> u16 {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("Failed to bind");
    let port = listener.local_addr().expect("No local addr").port();
    drop(listener);
    port
}
