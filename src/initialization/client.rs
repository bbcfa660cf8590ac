//! HTTP client initialization.

use std::sync::Arc;

use reqwest::ClientBuilder;

use crate::config::{CheckerConfig, MAX_REDIRECT_HOPS};
use crate::dns::CachingResolver;
use crate::error_handling::InitializationError;

/// Initializes the HTTP client shared by all probes of a checker.
///
/// Creates a `reqwest::Client` configured with:
/// - Connect-phase timeout and total request timeout from the checker config
/// - Keep-alive pool (idle timeout and per-host idle cap)
/// - Redirect following (up to `MAX_REDIRECT_HOPS`)
/// - The caching DNS resolver
/// - Optional TLS verification bypass
///
/// # Errors
///
/// Returns `InitializationError::HttpClientError` if client creation fails.
pub fn init_client(
    config: &CheckerConfig,
    resolver: Arc<CachingResolver>,
) -> Result<Arc<reqwest::Client>, InitializationError> {
    let client = ClientBuilder::new()
        .connect_timeout(config.connect_timeout)
        .timeout(config.total_timeout)
        .pool_idle_timeout(config.pool_idle_timeout)
        .pool_max_idle_per_host(config.max_connections_per_host)
        .tcp_keepalive(config.pool_idle_timeout)
        .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECT_HOPS))
        .user_agent(config.user_agent.clone())
        .danger_accept_invalid_certs(!config.verify_tls)
        .dns_resolver(resolver)
        .build()?;
    Ok(Arc::new(client))
}
