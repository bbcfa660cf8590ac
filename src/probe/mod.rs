//! Single-target reachability probes.
//!
//! The `Probe` trait is the seam between the scheduler and the network: the
//! scheduler only ever sees `CheckResult`s, so a failing probe can never abort
//! a batch. `HttpProbe` is the production implementation.

mod http;

use async_trait::async_trait;

use crate::check::CheckResult;
use crate::domain::DomainTarget;

pub use http::HttpProbe;

/// Performs one reachability check against one target.
///
/// Implementations must represent every failure as a returned `CheckResult`
/// rather than an error; they must not mutate state shared with other probes
/// beyond what their connection pool does internally.
#[async_trait]
pub trait Probe: Send + Sync {
    async fn probe(&self, target: &DomainTarget) -> CheckResult;

    /// Called once at the end of every run, cancelled or not.
    async fn after_run(&self) {}
}
