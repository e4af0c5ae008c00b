// In crates/engine/src/format.rs

//! Operator-facing SMS texts.

use crate::ledger::RiskSnapshot;
use core_types::{Ticket, TicketStatus};
use rust_decimal::{Decimal, RoundingStrategy};

/// Fixed-point rendering, half away from zero.
fn fixed(value: Decimal, dp: u32) -> String {
    let mut rounded = value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(dp);
    rounded.to_string()
}

pub fn ticket_opened(t: &Ticket) -> String {
    let code = &t.code;
    format!(
        "Ticket {code} • {} {} QTY {} @MKT SL {} (Risk/ctr ${})\n\
         Reply: Y{code}=CONFIRM, N{code}=CANCEL, Q{code}=<qty>, S{code}=<stop>\n\
         STATUS/PAUSE/RESUME/HELP",
        t.symbol,
        t.side,
        t.qty,
        fixed(t.stop, 4),
        fixed(t.risk_per_contract, 0)
    )
}

pub fn status(s: &RiskSnapshot) -> String {
    format!(
        "PnL Loss Used ${} / Cap ${} • Left ${} • Paused={}",
        fixed(s.realized_loss, 0),
        fixed(s.daily_cap, 0),
        fixed(s.remaining, 0),
        s.paused
    )
}

pub fn flat_reminder(symbol: &str) -> String {
    format!("(Note) FLAT {symbol}: close manually on your DOM (Apex-safe).")
}

pub fn not_found(code: &str) -> String {
    format!("Ticket {code} not found.")
}

pub fn already_resolved(code: &str, status: TicketStatus) -> String {
    format!("Ticket {code} already {status}.")
}

pub fn cancelled(t: &Ticket) -> String {
    format!("Cancelled {} • {} {}", t.code, t.symbol, t.side)
}

pub fn qty_set(t: &Ticket) -> String {
    format!("Qty set: {}", adjusted(t))
}

pub fn stop_set(t: &Ticket) -> String {
    format!("Stop set: {}", adjusted(t))
}

fn adjusted(t: &Ticket) -> String {
    format!("{} {} QTY {} @MKT SL {} (code {})", t.symbol, t.side, t.qty, fixed(t.stop, 4), t.code)
}

pub fn stop_usage(code: &str) -> String {
    format!("Send like: S{code}=2450.5")
}

pub fn paused_confirm(code: &str) -> String {
    format!("Paused. Send RESUME before confirming {code}.")
}

pub fn enter_now(t: &Ticket) -> String {
    format!(
        "ENTER NOW\n{} {} QTY {} @MKT\nSTOP {}\n(Place in DOM) • Code {}",
        t.symbol,
        t.side,
        t.qty,
        fixed(t.stop, 4),
        t.code
    )
}

pub const QTY_TOO_SMALL: &str = "Qty must be >= 1";
pub const PAUSED: &str = "Paused.";
pub const RESUMED: &str = "Resumed.";
pub const UNKNOWN: &str = "Unknown. Send HELP.";
