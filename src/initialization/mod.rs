//! Application initialization and resource setup.
//!
//! This module provides functions to initialize shared resources:
//! - Logger
//! - HTTP client (timeouts, keep-alive pool, caching resolver)
//! - Upstream DNS resolver
//! - Concurrency semaphore
//!
//! All fallible initialization functions return `InitializationError`.

mod client;
mod logger;
mod resolver;

use std::sync::Arc;

use tokio::sync::Semaphore;

// Re-export public API
pub use client::init_client;
pub use logger::init_logger_with;
pub use resolver::init_resolver;

/// Initializes a semaphore for controlling concurrency.
///
/// The semaphore is the admission gate for probes: one permit per probe in
/// flight, shared across every batch of a run.
pub fn init_semaphore(count: usize) -> Arc<Semaphore> {
    Arc::new(Semaphore::new(count))
}
