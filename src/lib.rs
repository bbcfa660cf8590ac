//! domain_watch library: concurrent domain reachability checking
//!
//! This library probes many domains over HTTP(S) with a global concurrency
//! cap, classifies each one as UP, DOWN or UNKNOWN, writes every result of a
//! run to a status store in one bulk operation and reports only the domains
//! whose status changed.
//!
//! # Example
//!
//! ```no_run
//! use domain_watch::{Checker, CheckerConfig, DomainTarget};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let checker = Checker::from_config(CheckerConfig {
//!     max_concurrency: 50,
//!     ..Default::default()
//! })?;
//!
//! let run = checker
//!     .run(vec![
//!         DomainTarget::ungrouped("example.com"),
//!         DomainTarget::new("https://api.example.com/health", "Api"),
//!     ])
//!     .await;
//! for result in &run.results {
//!     println!("{}: {}", result.domain, result.describe());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Requirements
//!
//! This library requires a Tokio runtime. Use `#[tokio::main]` in your application
//! or ensure you're calling library functions within an async context.

mod check;
pub mod config;
pub mod dns;
mod domain;
pub mod error_handling;
pub mod initialization;
mod monitor;
pub mod notify;
mod probe;
mod scheduler;
pub mod status_server;
pub mod storage;

// Re-export public API
pub use check::{CheckResult, CheckRun, DownReason, Outcome, RunSummary, Status};
pub use config::{CheckerConfig, Config, LogFormat, LogLevel};
pub use domain::{
    normalize_target, parse_domain_list, partition_targets, validate_target, DomainTarget,
    InvalidTarget,
};
pub use error_handling::{ConfigError, InitializationError, NotifyError, ProbeError, StoreError};
pub use monitor::{CycleReport, Monitor};
pub use notify::{LogSink, NotificationSink, Transition, WebhookSink};
pub use probe::{HttpProbe, Probe};
pub use scheduler::Checker;
pub use storage::{MemoryStore, SqliteStore, StatusStore, TargetSource};
