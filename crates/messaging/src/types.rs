// In crates/messaging/src/types.rs

use serde::Deserialize;

/// The parts of Twilio's message resource we read back.
#[derive(Debug, Deserialize, Clone)]
pub struct MessageResource {
    /// The message SID (e.g. "SM...").
    pub sid: String,
    /// Delivery status at creation time, usually "accepted" or "queued".
    #[serde(default)]
    pub status: Option<String>,
}

/// A message recorded by the in-memory outbox.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    pub to: String,
    pub body: String,
}

/// A recipient the fan-out could not reach.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryFailure {
    pub recipient: String,
    pub error: String,
}

/// The outcome of sending one text to every recipient.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeliveryReport {
    pub delivered: Vec<String>,
    pub failed: Vec<DeliveryFailure>,
}

impl DeliveryReport {
    /// True when there was someone to reach and nobody was reached.
    pub fn all_failed(&self) -> bool {
        self.delivered.is_empty() && !self.failed.is_empty()
    }
}
