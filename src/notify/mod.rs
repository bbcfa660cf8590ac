//! Transition events and their delivery.

mod sink;
mod transition;

pub use sink::{LogSink, NotificationSink, WebhookSink};
pub use transition::{is_transition, Transition};
