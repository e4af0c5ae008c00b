// In crates/engine/src/intake.rs

use crate::format;
use crate::ledger::RiskLedger;
use crate::{notify, Result};
use core_types::{AlertPayload, NewTicket, Ticket};
use messaging::Notifier;
use risk::{normalize, Rejection, RiskManager};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::fmt;
use std::sync::Arc;
use tickets::TicketBook;

/// Placeholder distance above the stop used to size alerts without an entry.
const MISSING_ENTRY_OFFSET: Decimal = dec!(10);

/// Why an alert did not open a ticket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterReason {
    SymbolNotWhitelisted,
    StopRequired,
    Paused,
    Sizing(Rejection),
}

impl FilterReason {
    pub fn as_str(self) -> &'static str {
        match self {
            FilterReason::SymbolNotWhitelisted => "symbol_not_whitelisted",
            FilterReason::StopRequired => "stop_required",
            FilterReason::Paused => "paused",
            FilterReason::Sizing(rejection) => rejection.as_str(),
        }
    }
}

impl fmt::Display for FilterReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum IntakeOutcome {
    Filtered(FilterReason),
    Created(Ticket),
}

/// Turns trade alerts into pending tickets and tells the operator.
#[derive(Clone)]
pub struct AlertIntake {
    whitelist: Vec<String>,
    sizer: Arc<dyn RiskManager>,
    ledger: RiskLedger,
    book: TicketBook,
    notifier: Arc<dyn Notifier>,
    recipients: Vec<String>,
}

impl AlertIntake {
    pub fn new(
        whitelist: &[String],
        sizer: Arc<dyn RiskManager>,
        ledger: RiskLedger,
        book: TicketBook,
        notifier: Arc<dyn Notifier>,
        recipients: Vec<String>,
    ) -> Self {
        let whitelist = whitelist
            .iter()
            .map(|s| s.trim().to_uppercase())
            .filter(|s| !s.is_empty())
            .collect();
        Self { whitelist, sizer, ledger, book, notifier, recipients }
    }

    /// Whitelisted exactly, or by instrument root.
    pub fn is_whitelisted(&self, symbol: &str) -> bool {
        let root = normalize(symbol);
        self.whitelist.iter().any(|w| *w == symbol || *w == root)
    }

    pub async fn process(&self, alert: AlertPayload) -> Result<IntakeOutcome> {
        let symbol = alert.symbol.trim().to_uppercase();

        if !self.is_whitelisted(&symbol) {
            return Ok(self.filtered(&symbol, FilterReason::SymbolNotWhitelisted));
        }
        let Some(stop) = alert.stop else {
            return Ok(self.filtered(&symbol, FilterReason::StopRequired));
        };
        if self.ledger.is_paused().await? {
            return Ok(self.filtered(&symbol, FilterReason::Paused));
        }

        let entry = alert.entry.unwrap_or(stop + MISSING_ENTRY_OFFSET);
        let day = self.ledger.report_day();
        let loss_used = self.ledger.loss_used(day).await?;

        let sizing = match self.sizer.evaluate(&symbol, entry, stop, loss_used) {
            Ok(sizing) => sizing,
            Err(risk::Error::Vetoed { reason }) => {
                return Ok(self.filtered(&symbol, FilterReason::Sizing(reason)));
            }
            Err(e) => return Err(e.into()),
        };

        let ticket = self
            .book
            .create(NewTicket {
                symbol,
                side: alert.side.trim().to_uppercase(),
                entry,
                stop,
                qty: sizing.qty,
                risk_per_contract: sizing.risk_per_contract,
                timeframe: alert.timeframe.unwrap_or_else(core_types::ticket::default_timeframe),
                strategy: alert.strategy,
                note: alert.note,
            })
            .await?;

        tracing::info!(
            code = %ticket.code,
            symbol = %ticket.symbol,
            side = %ticket.side,
            qty = ticket.qty,
            ticks = %sizing.ticks,
            rpc = %ticket.risk_per_contract,
            loss_used = %loss_used,
            "Alert accepted."
        );

        notify(self.notifier.as_ref(), &self.recipients, &format::ticket_opened(&ticket)).await?;
        Ok(IntakeOutcome::Created(ticket))
    }

    fn filtered(&self, symbol: &str, reason: FilterReason) -> IntakeOutcome {
        tracing::info!(symbol, reason = reason.as_str(), "Alert filtered.");
        IntakeOutcome::Filtered(reason)
    }
}
