//! Error handling.
//!
//! This module provides:
//! - Error type definitions for configuration, initialization, storage and alerts
//! - The `ProbeError` taxonomy carried inside DOWN results
//! - Categorization of `reqwest` errors into that taxonomy

mod categorization;
mod types;

// Re-export public API
pub use categorization::{alert_retry_strategy, categorize_reqwest_error, truncate_message};
pub use types::{
    ConfigError, ErrorKind, InitializationError, NotifyError, ProbeError, StoreError,
};
