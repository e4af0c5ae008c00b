// In crates/messaging/src/lib.rs

use app_config::types::{NotifierBackend, NotifierSettings};
use async_trait::async_trait;
use futures::future::join_all;
use std::sync::Arc;

pub mod error;
pub mod outbox;
pub mod twilio;
pub mod types;

// Re-export public types
pub use error::{Error, Result};
pub use outbox::Outbox;
pub use twilio::TwilioClient;
pub use types::{DeliveryFailure, DeliveryReport, SentMessage};

/// Longest body sent in one message; longer texts are cut.
pub const MAX_BODY_CHARS: usize = 1400;

/// A one-way text channel to a single recipient.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// The name of the channel, for logs.
    fn name(&self) -> &'static str;

    /// Sends `body` to `to`. Success means the provider accepted it, not
    /// that it was delivered.
    async fn send(&self, to: &str, body: &str) -> Result<()>;
}

/// Builds the notifier backend selected in the settings.
pub fn new(settings: &NotifierSettings) -> Result<Arc<dyn Notifier>> {
    let notifier: Arc<dyn Notifier> = match settings.backend {
        NotifierBackend::Log => Arc::new(Outbox::new()),
        NotifierBackend::Twilio => Arc::new(TwilioClient::new(settings)?),
    };
    tracing::info!(backend = notifier.name(), "Notifier ready.");
    Ok(notifier)
}

/// Sends one text to every recipient concurrently.
///
/// Failures are collected per recipient rather than stopping the fan-out.
pub async fn broadcast(notifier: &dyn Notifier, recipients: &[String], text: &str) -> DeliveryReport {
    let body = truncate(text, MAX_BODY_CHARS);
    let body = body.as_str();

    let sends = recipients
        .iter()
        .map(|to| async move { (to, notifier.send(to, body).await) });

    let mut report = DeliveryReport::default();
    for (to, result) in join_all(sends).await {
        match result {
            Ok(()) => report.delivered.push(to.clone()),
            Err(e) => {
                tracing::warn!(to = %to, error = %e, "Failed to send SMS.");
                report.failed.push(DeliveryFailure { recipient: to.clone(), error: e.to_string() });
            }
        }
    }
    report
}

fn truncate(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Unreachable;

    #[async_trait]
    impl Notifier for Unreachable {
        fn name(&self) -> &'static str {
            "Unreachable"
        }

        async fn send(&self, to: &str, _body: &str) -> Result<()> {
            if to.ends_with('9') {
                Err(Error::ApiError { code: 30003, msg: "Unreachable destination handset".into() })
            } else {
                Ok(())
            }
        }
    }

    fn numbers(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn broadcast_reaches_every_recipient_and_truncates() {
        let outbox = Outbox::new();
        let long = "x".repeat(MAX_BODY_CHARS + 50);

        let report = broadcast(&outbox, &numbers(&["+1", "+2"]), &long).await;

        assert_eq!(report.delivered, numbers(&["+1", "+2"]));
        assert!(report.failed.is_empty());
        let sent = outbox.messages();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].body.chars().count(), MAX_BODY_CHARS);
    }

    #[tokio::test]
    async fn broadcast_collects_failures() {
        let report = broadcast(&Unreachable, &numbers(&["+10", "+19"]), "hi").await;
        assert_eq!(report.delivered, numbers(&["+10"]));
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].recipient, "+19");
        assert!(!report.all_failed());

        let report = broadcast(&Unreachable, &numbers(&["+19"]), "hi").await;
        assert!(report.all_failed());
    }

    #[tokio::test]
    async fn no_recipients_is_not_a_failure() {
        let report = broadcast(&Unreachable, &[], "hi").await;
        assert!(!report.all_failed());
    }
}
