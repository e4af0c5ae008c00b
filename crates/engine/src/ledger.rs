// In crates/engine/src/ledger.rs

use crate::Result;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use risk::RiskSettings;
use rust_decimal::Decimal;
use serde::Serialize;
use std::str::FromStr;
use std::sync::Arc;
use store::{keys, KvStore};

/// The loss budget as it stands for one report day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskSnapshot {
    pub date: NaiveDate,
    #[serde(with = "rust_decimal::serde::float")]
    pub daily_cap: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub per_trade_cap: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub realized_loss: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub remaining: Decimal,
    pub paused: bool,
}

/// Reads the daily loss counter and owns the pause flag.
///
/// The loss counter is written by whatever books realized P&L; the relay only
/// reads it.
#[derive(Clone)]
pub struct RiskLedger {
    store: Arc<dyn KvStore>,
    settings: RiskSettings,
}

impl RiskLedger {
    pub fn new(store: Arc<dyn KvStore>, settings: RiskSettings) -> Self {
        Self { store, settings }
    }

    pub fn settings(&self) -> &RiskSettings {
        &self.settings
    }

    /// The report day containing `now`.
    pub fn report_day_at(&self, now: DateTime<Utc>) -> NaiveDate {
        (now + Duration::minutes(i64::from(self.settings.report_utc_offset_minutes))).date_naive()
    }

    pub fn report_day(&self) -> NaiveDate {
        self.report_day_at(Utc::now())
    }

    /// Realized loss booked for `day`. Missing or unreadable values count as zero.
    pub async fn loss_used(&self, day: NaiveDate) -> Result<Decimal> {
        let key = keys::daily_loss(day);
        let Some(raw) = self.store.get(&key).await? else {
            return Ok(Decimal::ZERO);
        };

        match Decimal::from_str(raw.trim().trim_matches('"')) {
            Ok(used) if used.is_sign_negative() => {
                tracing::warn!(key = %key, value = %raw, "Daily loss counter is negative. Treating it as zero.");
                Ok(Decimal::ZERO)
            }
            Ok(used) => Ok(used),
            Err(e) => {
                tracing::warn!(key = %key, value = %raw, error = %e, "Daily loss counter is not a number. Treating it as zero.");
                Ok(Decimal::ZERO)
            }
        }
    }

    pub async fn is_paused(&self) -> Result<bool> {
        Ok(self.store.get(keys::PAUSED).await?.is_some())
    }

    pub async fn pause(&self) -> Result<()> {
        self.store.set(keys::PAUSED, "1").await?;
        tracing::warn!("Relay paused by operator.");
        Ok(())
    }

    pub async fn resume(&self) -> Result<()> {
        self.store.delete(keys::PAUSED).await?;
        tracing::info!("Relay resumed by operator.");
        Ok(())
    }

    pub async fn snapshot(&self) -> Result<RiskSnapshot> {
        self.snapshot_for(self.report_day()).await
    }

    pub async fn snapshot_for(&self, date: NaiveDate) -> Result<RiskSnapshot> {
        let daily_cap = self.settings.daily_cap();
        let realized_loss = self.loss_used(date).await?;
        Ok(RiskSnapshot {
            date,
            daily_cap,
            per_trade_cap: self.settings.per_trade_cap(),
            realized_loss,
            remaining: daily_cap
                .checked_sub(realized_loss)
                .unwrap_or(Decimal::ZERO)
                .max(Decimal::ZERO),
            paused: self.is_paused().await?,
        })
    }
}
