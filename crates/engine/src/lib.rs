// In crates/engine/src/lib.rs

pub mod error;
pub mod format;
pub mod intake;
pub mod ledger;
pub mod reply;

pub use error::{Error, Result};
pub use intake::{AlertIntake, FilterReason, IntakeOutcome};
pub use ledger::{RiskLedger, RiskSnapshot};
pub use reply::ReplyHandler;

use app_config::Settings;
use core_types::AlertPayload;
use messaging::Notifier;
use risk::DailyCapSizer;
use std::sync::Arc;
use store::KvStore;
use tickets::TicketBook;

/// The relay: alert intake, operator replies and the risk ledger, wired to
/// one store and one notifier.
#[derive(Clone)]
pub struct Relay {
    intake: AlertIntake,
    replies: ReplyHandler,
    ledger: RiskLedger,
}

impl Relay {
    /// Wires every component from the loaded settings.
    pub fn new(settings: &Settings, store: Arc<dyn KvStore>, notifier: Arc<dyn Notifier>) -> Result<Self> {
        let sizer = Arc::new(DailyCapSizer::new(settings.risk.clone())?);
        let ledger = RiskLedger::new(store.clone(), settings.risk.clone());
        let book = TicketBook::new(store, &settings.tickets);
        let recipients: Vec<String> = settings
            .notifier
            .recipients
            .iter()
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty())
            .collect();

        tracing::info!(
            daily_cap = %ledger.settings().daily_cap(),
            per_trade_cap = %ledger.settings().per_trade_cap(),
            whitelist = ?settings.alerts.symbol_whitelist,
            recipients = recipients.len(),
            "Relay initialized."
        );

        Ok(Self {
            intake: AlertIntake::new(
                &settings.alerts.symbol_whitelist,
                sizer,
                ledger.clone(),
                book.clone(),
                notifier.clone(),
                recipients.clone(),
            ),
            replies: ReplyHandler::new(ledger.clone(), book, notifier, recipients),
            ledger,
        })
    }

    pub async fn handle_alert(&self, alert: AlertPayload) -> Result<IntakeOutcome> {
        self.intake.process(alert).await
    }

    pub async fn handle_reply(&self, text: &str) -> Result<String> {
        self.replies.handle(text).await
    }

    pub async fn risk_state(&self) -> Result<RiskSnapshot> {
        self.ledger.snapshot().await
    }

    pub fn ledger(&self) -> &RiskLedger {
        &self.ledger
    }
}

/// Fans a text out to every recipient. Fails only when nobody was reached.
pub(crate) async fn notify(notifier: &dyn Notifier, recipients: &[String], text: &str) -> Result<()> {
    if recipients.is_empty() {
        tracing::warn!("No recipients configured; text not sent.");
        return Ok(());
    }

    let report = messaging::broadcast(notifier, recipients, text).await;
    if report.all_failed() {
        return Err(Error::Undelivered { failures: report.failed });
    }
    if !report.failed.is_empty() {
        tracing::warn!(
            delivered = report.delivered.len(),
            failed = report.failed.len(),
            "Text reached only some recipients."
        );
    }
    Ok(())
}
