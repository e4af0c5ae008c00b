// In crates/engine/src/reply.rs

use crate::format;
use crate::ledger::RiskLedger;
use crate::{notify, Result};
use commands::{Command, TicketAction, TicketCommand, HELP_TEXT};
use messaging::Notifier;
use std::sync::Arc;
use tickets::{parse_stop_price, TicketBook};

/// Answers operator SMS replies.
///
/// Every reply produces exactly one outbound text, sent to all recipients.
#[derive(Clone)]
pub struct ReplyHandler {
    ledger: RiskLedger,
    book: TicketBook,
    notifier: Arc<dyn Notifier>,
    recipients: Vec<String>,
}

impl ReplyHandler {
    pub fn new(ledger: RiskLedger, book: TicketBook, notifier: Arc<dyn Notifier>, recipients: Vec<String>) -> Self {
        Self { ledger, book, notifier, recipients }
    }

    /// Handles one inbound text and returns the answer that was sent.
    pub async fn handle(&self, text: &str) -> Result<String> {
        let command = commands::parse(text);
        tracing::info!(?command, "Operator reply received.");

        let answer = self.respond(command).await?;
        notify(self.notifier.as_ref(), &self.recipients, &answer).await?;
        Ok(answer)
    }

    /// Applies a command and composes the answer, without sending it.
    pub async fn respond(&self, command: Command) -> Result<String> {
        let answer = match command {
            Command::Help => HELP_TEXT.to_string(),
            Command::Status => format::status(&self.ledger.snapshot().await?),
            Command::Pause => {
                self.ledger.pause().await?;
                format::PAUSED.to_string()
            }
            Command::Resume => {
                self.ledger.resume().await?;
                format::RESUMED.to_string()
            }
            Command::Flat { symbol } => format::flat_reminder(&symbol),
            Command::Ticket(cmd) => self.on_ticket(cmd).await?,
            Command::Unknown => format::UNKNOWN.to_string(),
        };
        Ok(answer)
    }

    async fn on_ticket(&self, cmd: TicketCommand) -> Result<String> {
        let code = cmd.code.as_str();

        let Some(ticket) = self.book.find_by_code(code).await? else {
            return Ok(format::not_found(code));
        };
        if ticket.status.is_terminal() {
            return Ok(format::already_resolved(code, ticket.status));
        }
        let id = ticket.id;

        let outcome = match cmd.action {
            TicketAction::Cancel => self.book.cancel(&id).await.map(|t| format::cancelled(&t)),
            TicketAction::SetQty => {
                let qty = cmd.quantity().unwrap_or(0);
                self.book.set_qty(&id, qty).await.map(|t| format::qty_set(&t))
            }
            TicketAction::SetStop => {
                let Some(stop) = cmd.value.as_deref().and_then(|v| parse_stop_price(v).ok()) else {
                    return Ok(format::stop_usage(code));
                };
                self.book.set_stop(&id, stop).await.map(|t| format::stop_set(&t))
            }
            TicketAction::Confirm => {
                if self.ledger.is_paused().await? {
                    tracing::info!(code, "Confirm held while paused.");
                    return Ok(format::paused_confirm(code));
                }
                self.book.confirm_for_instruction(&id).await.map(|t| format::enter_now(&t))
            }
        };

        match outcome {
            Ok(answer) => Ok(answer),
            Err(tickets::Error::InvalidQuantity(_)) => Ok(format::QTY_TOO_SMALL.to_string()),
            Err(tickets::Error::InvalidPrice(_)) => Ok(format::stop_usage(code)),
            // Another reply resolved the ticket between our read and the transition.
            Err(tickets::Error::AlreadyResolved(status)) => Ok(format::already_resolved(code, status)),
            Err(tickets::Error::NotFound(_)) => Ok(format::not_found(code)),
            Err(e) => Err(e.into()),
        }
    }
}
