// In crates/web-server/src/types.rs

use core_types::Ticket;
use engine::IntakeOutcome;
use serde::{Deserialize, Serialize};

/// The body of `POST /api/alert` responses.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum AlertResponse {
    Filtered { ok: bool, filtered: &'static str },
    Created { ok: bool, ticket: Ticket },
}

impl From<IntakeOutcome> for AlertResponse {
    fn from(outcome: IntakeOutcome) -> Self {
        match outcome {
            IntakeOutcome::Filtered(reason) => AlertResponse::Filtered { ok: true, filtered: reason.as_str() },
            IntakeOutcome::Created(ticket) => AlertResponse::Created { ok: true, ticket },
        }
    }
}

/// The fields of Twilio's inbound message webhook we use.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct InboundSms {
    #[serde(rename = "Body")]
    pub body: String,
    #[serde(rename = "From")]
    pub from: String,
}
