//! TTL-bounded cache of resolved addresses.

use std::collections::HashMap;
use std::net::IpAddr;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;

struct CacheEntry {
    addrs: Vec<IpAddr>,
    expires_at: Instant,
}

/// Host name to address cache shared by every probe of a checker.
///
/// Entries live for a fixed TTL regardless of the record TTL returned by the
/// upstream resolver, so domains probed on a fixed schedule skip the lookup
/// on most cycles. A zero TTL disables caching.
pub struct DnsCache {
    ttl: Duration,
    entries: RwLock<HashMap<String, CacheEntry>>,
}

impl DnsCache {
    pub fn new(ttl: Duration) -> Self {
        DnsCache {
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Returns the cached addresses for `host` if present and not expired.
    pub async fn get(&self, host: &str) -> Option<Vec<IpAddr>> {
        let key = host.to_ascii_lowercase();
        {
            let entries = self.entries.read().await;
            match entries.get(&key) {
                Some(entry) if entry.expires_at > Instant::now() => {
                    return Some(entry.addrs.clone())
                }
                Some(_) => {}
                None => return None,
            }
        }
        // Expired: drop it so the map does not grow with dead hosts
        let mut entries = self.entries.write().await;
        if entries
            .get(&key)
            .is_some_and(|entry| entry.expires_at <= Instant::now())
        {
            entries.remove(&key);
        }
        None
    }

    /// Stores `addrs` for `host`. Empty answers are not cached.
    pub async fn insert(&self, host: &str, addrs: Vec<IpAddr>) {
        if self.ttl.is_zero() || addrs.is_empty() {
            return;
        }
        let entry = CacheEntry {
            addrs,
            expires_at: Instant::now() + self.ttl,
        };
        self.entries
            .write()
            .await
            .insert(host.to_ascii_lowercase(), entry);
    }

    /// Removes every expired entry.
    pub async fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| entry.expires_at > now);
        before - entries.len()
    }

    /// Number of entries currently held, expired ones included.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;
    use tokio::time::sleep;

    fn ip(last: u8) -> IpAddr {
        IpAddr::V4(Ipv4Addr::new(192, 0, 2, last))
    }

    #[tokio::test]
    async fn test_cache_hit_within_ttl() {
        let cache = DnsCache::new(Duration::from_secs(60));
        cache.insert("example.com", vec![ip(1)]).await;
        assert_eq!(cache.get("example.com").await, Some(vec![ip(1)]));
    }

    #[tokio::test]
    async fn test_cache_is_case_insensitive() {
        let cache = DnsCache::new(Duration::from_secs(60));
        cache.insert("Example.COM", vec![ip(2)]).await;
        assert_eq!(cache.get("example.com").await, Some(vec![ip(2)]));
    }

    #[tokio::test]
    async fn test_cache_expires_after_ttl() {
        let cache = DnsCache::new(Duration::from_millis(20));
        cache.insert("example.com", vec![ip(1)]).await;
        sleep(Duration::from_millis(40)).await;
        assert_eq!(cache.get("example.com").await, None);
        assert_eq!(cache.len().await, 0, "expired entry should be evicted");
    }

    #[tokio::test]
    async fn test_zero_ttl_disables_cache() {
        let cache = DnsCache::new(Duration::ZERO);
        cache.insert("example.com", vec![ip(1)]).await;
        assert_eq!(cache.get("example.com").await, None);
        assert_eq!(cache.len().await, 0);
    }

    #[tokio::test]
    async fn test_empty_answer_not_cached() {
        let cache = DnsCache::new(Duration::from_secs(60));
        cache.insert("example.com", Vec::new()).await;
        assert_eq!(cache.len().await, 0);
    }

    #[tokio::test]
    async fn test_purge_expired() {
        let cache = DnsCache::new(Duration::from_millis(20));
        cache.insert("a.example", vec![ip(1)]).await;
        cache.insert("b.example", vec![ip(2)]).await;
        sleep(Duration::from_millis(40)).await;
        assert_eq!(cache.purge_expired().await, 2);
        assert_eq!(cache.len().await, 0);
    }
}
