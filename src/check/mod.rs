//! Check results and run aggregates.
//!
//! A probe classifies its target into an `Outcome`:
//! - `Up { status_code }` for a response in [200, 400)
//! - `Down(Http { status_code })` for any other response
//! - `Down(Transport { error })` when no response was obtained
//! - `Unknown` when the target was never probed

mod result;
mod run;

// Re-export public API
pub use result::{CheckResult, DownReason, Outcome, Status};
pub use run::{CheckRun, RunSummary};
