// In crates/tickets/src/lifecycle.rs

use crate::{Error, Result};
use core_types::{Ticket, TicketStatus};
use rust_decimal::Decimal;
use std::str::FromStr;

/// A change requested on a pending ticket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Cancel,
    SetQty(i64),
    SetStop(Decimal),
    /// The operator is told to place the order by hand. Terminal.
    ConfirmForInstruction,
}

impl Transition {
    pub fn name(self) -> &'static str {
        match self {
            Transition::Cancel => "cancel",
            Transition::SetQty(_) => "set_qty",
            Transition::SetStop(_) => "set_stop",
            Transition::ConfirmForInstruction => "confirm_for_instruction",
        }
    }
}

/// Applies a transition, returning the updated ticket.
///
/// Only `PENDING` tickets move. The input ticket is never modified, so a
/// rejected transition leaves nothing to write back.
pub fn apply(ticket: &Ticket, transition: Transition) -> Result<Ticket> {
    if ticket.status.is_terminal() {
        return Err(Error::AlreadyResolved(ticket.status));
    }

    let mut next = ticket.clone();
    match transition {
        Transition::Cancel => next.status = TicketStatus::Cancelled,
        Transition::SetQty(qty) => {
            next.qty = u32::try_from(qty)
                .ok()
                .filter(|q| *q >= 1)
                .ok_or(Error::InvalidQuantity(qty))?;
        }
        Transition::SetStop(stop) => next.stop = stop,
        Transition::ConfirmForInstruction => next.status = TicketStatus::Instructed,
    }
    Ok(next)
}

/// Parses an operator-typed stop price.
pub fn parse_stop_price(raw: &str) -> Result<Decimal> {
    let trimmed = raw.trim();
    Decimal::from_str(trimmed).map_err(|_| Error::InvalidPrice(trimmed.to_string()))
}
