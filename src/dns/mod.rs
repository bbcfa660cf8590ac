//! DNS resolution with a shared TTL cache.
//!
//! The checker hands `CachingResolver` to reqwest so every probe, in every
//! run of the same checker, shares one cache of resolved addresses.

mod cache;
mod resolver;

// Re-export public API
pub use cache::DnsCache;
pub use resolver::{CachingResolver, DnsLookupError};
