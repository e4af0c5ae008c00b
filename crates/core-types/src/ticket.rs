// In crates/core-types/src/ticket.rs

use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::alert::de_text;

/// The lifecycle state of a ticket.
///
/// `Pending` is the only state that accepts mutations. `Cancelled` and
/// `Instructed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TicketStatus {
    Pending,
    Cancelled,
    /// The operator has been told to place the order by hand.
    Instructed,
}

impl TicketStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            TicketStatus::Pending => "PENDING",
            TicketStatus::Cancelled => "CANCELLED",
            TicketStatus::Instructed => "INSTRUCTED",
        }
    }

    pub fn is_terminal(self) -> bool {
        !matches!(self, TicketStatus::Pending)
    }
}

impl fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The fields alert intake supplies when it opens a ticket.
///
/// `risk_per_contract` is the sizing figure; it is rounded to whole
/// currency units only when the ticket is opened.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTicket {
    pub symbol: String,
    pub side: String,
    pub entry: Decimal,
    pub stop: Decimal,
    pub qty: u32,
    pub risk_per_contract: Decimal,
    pub timeframe: String,
    pub strategy: String,
    pub note: String,
}

/// A unit of risk under operator review.
///
/// The serialized field names match the records already stored under
/// `ticket:<id>`, so `rpc` and `ts` keep their short names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ticket {
    pub id: String,
    pub code: String,
    pub status: TicketStatus,
    pub symbol: String,
    pub side: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub entry: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub stop: Decimal,
    pub qty: u32,
    #[serde(rename = "rpc", with = "rust_decimal::serde::float")]
    pub risk_per_contract: Decimal,
    #[serde(default = "default_timeframe", deserialize_with = "de_text")]
    pub timeframe: String,
    #[serde(default, deserialize_with = "de_text")]
    pub strategy: String,
    #[serde(default, deserialize_with = "de_text")]
    pub note: String,
    #[serde(rename = "ts")]
    pub created_at: DateTime<Utc>,
}

impl Ticket {
    /// Opens a new `PENDING` ticket from intake fields.
    pub fn open(id: String, code: String, fields: NewTicket, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            code,
            status: TicketStatus::Pending,
            symbol: fields.symbol,
            side: fields.side,
            entry: fields.entry,
            stop: fields.stop,
            qty: fields.qty,
            risk_per_contract: fields
                .risk_per_contract
                .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero),
            timeframe: fields.timeframe,
            strategy: fields.strategy,
            note: fields.note,
            created_at,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status == TicketStatus::Pending
    }
}

pub fn default_timeframe() -> String {
    "1".to_string()
}
