//! Application configuration and constants.
//!
//! This module provides:
//! - Policy constants (concurrency, batching, timeouts, schedule)
//! - Library configuration structs
//! - CLI option enums

mod constants;
mod types;

// Re-export all constants
pub use constants::*;
pub use types::{CheckerConfig, Config, LogFormat, LogLevel};
