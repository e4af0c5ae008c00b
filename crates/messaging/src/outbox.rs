// In crates/messaging/src/outbox.rs

use crate::types::SentMessage;
use crate::{Notifier, Result};
use async_trait::async_trait;
use std::sync::{Mutex, PoisonError};

/// A notifier that logs messages and keeps them in memory instead of
/// sending them. Backs the `log` notifier backend and test assertions.
#[derive(Debug, Default)]
pub struct Outbox {
    sent: Mutex<Vec<SentMessage>>,
}

impl Outbox {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything "sent" so far, oldest first.
    pub fn messages(&self) -> Vec<SentMessage> {
        self.sent.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Bodies of every message, oldest first.
    pub fn bodies(&self) -> Vec<String> {
        self.messages().into_iter().map(|m| m.body).collect()
    }
}

#[async_trait]
impl Notifier for Outbox {
    fn name(&self) -> &'static str {
        "Outbox"
    }

    async fn send(&self, to: &str, body: &str) -> Result<()> {
        tracing::info!(to, body, "SMS (not sent)");
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(SentMessage { to: to.to_string(), body: body.to_string() });
        Ok(())
    }
}
