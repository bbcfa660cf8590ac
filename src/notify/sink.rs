//! Alert delivery sinks.

use async_trait::async_trait;
use serde::Serialize;
use tokio_retry::RetryIf;

use super::Transition;
use crate::config::WEBHOOK_TIMEOUT;
use crate::error_handling::{alert_retry_strategy, NotifyError};

/// Receives transition events and fans them out to its recipients.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    /// Delivers one transition to every recipient.
    ///
    /// Returns the failures; a failing recipient never prevents delivery to
    /// the others.
    async fn notify(&self, transition: &Transition) -> Vec<NotifyError>;
}

/// Writes alerts to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

#[async_trait]
impl NotificationSink for LogSink {
    async fn notify(&self, transition: &Transition) -> Vec<NotifyError> {
        let text = transition.message().replace("\n\n", ": ").replace('\n', ", ");
        if transition.is_recovery() {
            log::info!("{text}");
        } else {
            log::warn!("{text}");
        }
        Vec::new()
    }
}

#[derive(Serialize)]
struct WebhookPayload<'a> {
    text: String,
    transition: &'a Transition,
}

/// POSTs a JSON payload per transition to each configured URL.
///
/// Transport failures are retried with backoff; a recipient that answers
/// with an error status is not asked again.
pub struct WebhookSink {
    client: reqwest::Client,
    recipients: Vec<String>,
}

impl WebhookSink {
    /// # Errors
    ///
    /// Returns the reqwest error if the client cannot be built.
    pub fn new(recipients: Vec<String>, user_agent: &str) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(WEBHOOK_TIMEOUT)
            .user_agent(user_agent.to_string())
            .build()?;
        Ok(WebhookSink { client, recipients })
    }

    pub fn recipients(&self) -> &[String] {
        &self.recipients
    }

    async fn deliver(&self, recipient: &str, payload: &WebhookPayload<'_>) -> Result<(), NotifyError> {
        let response = self
            .client
            .post(recipient)
            .json(payload)
            .send()
            .await
            .map_err(|source| NotifyError::Delivery {
                recipient: recipient.to_string(),
                source,
            })?;
        let status = response.status();
        if !status.is_success() {
            return Err(NotifyError::Rejected {
                recipient: recipient.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl NotificationSink for WebhookSink {
    async fn notify(&self, transition: &Transition) -> Vec<NotifyError> {
        let payload = WebhookPayload {
            text: transition.message(),
            transition,
        };
        let mut failures = Vec::new();
        let payload = &payload;
        for recipient in &self.recipients {
            let recipient = recipient.as_str();
            let attempt = RetryIf::start(
                alert_retry_strategy(),
                move || self.deliver(recipient, payload),
                |e: &NotifyError| matches!(e, NotifyError::Delivery { .. }),
            );
            match attempt.await {
                Ok(()) => log::info!(
                    "Sent {} alert for {} to {}",
                    transition.current,
                    transition.domain,
                    recipient
                ),
                Err(e) => {
                    log::error!("{e}");
                    failures.push(e);
                }
            }
        }
        failures
    }
}
