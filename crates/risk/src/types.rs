// In crates/risk/src/types.rs

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;
use std::fmt;

/// Loss-budget settings, loaded from the `[risk]` config section.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct RiskSettings {
    /// The account's trailing drawdown cushion in dollars.
    #[serde(default = "default_trailing_cushion")]
    pub trailing_cushion: Decimal,
    /// Share of the cushion that may be lost in one day (0, 1].
    #[serde(default = "default_use_pct_of_cushion")]
    pub use_pct_of_cushion: Decimal,
    /// Share of the daily cap one trade may risk (0, 1].
    #[serde(default = "default_per_trade_pct_of_daily")]
    pub per_trade_pct_of_daily: Decimal,
    /// Offset from UTC of the operator's report day, in minutes.
    #[serde(default)]
    pub report_utc_offset_minutes: i32,
}

impl RiskSettings {
    pub fn daily_cap(&self) -> Decimal {
        self.trailing_cushion * self.use_pct_of_cushion
    }

    pub fn per_trade_cap(&self) -> Decimal {
        self.daily_cap() * self.per_trade_pct_of_daily
    }
}

impl Default for RiskSettings {
    fn default() -> Self {
        Self {
            trailing_cushion: default_trailing_cushion(),
            use_pct_of_cushion: default_use_pct_of_cushion(),
            per_trade_pct_of_daily: default_per_trade_pct_of_daily(),
            report_utc_offset_minutes: 0,
        }
    }
}

// Helper functions for serde defaults
fn default_trailing_cushion() -> Decimal { dec!(3000) }
fn default_use_pct_of_cushion() -> Decimal { dec!(0.5) }
fn default_per_trade_pct_of_daily() -> Decimal { dec!(0.2) }

/// The result of a successful sizing pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sizing {
    /// Number of contracts, always at least one.
    pub qty: u32,
    /// Stop distance in ticks, floored at one.
    pub ticks: Decimal,
    /// Dollar risk of one contract at the stop, never below its whole-dollar
    /// rounding.
    pub risk_per_contract: Decimal,
}

impl Sizing {
    pub fn total_risk(&self) -> Decimal {
        Decimal::from(self.qty) * self.risk_per_contract
    }
}

/// Why a trade was not sized. These are expected outcomes, reported back to
/// the alert source as a filter reason.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rejection {
    UnknownInstrument,
    DailyCapReached,
    RiskTooWideForCap,
    /// The price distance could not be expressed in ticks.
    InvalidTicks,
}

impl Rejection {
    pub fn as_str(self) -> &'static str {
        match self {
            Rejection::UnknownInstrument => "unknown_instrument",
            Rejection::DailyCapReached => "daily_cap_reached",
            Rejection::RiskTooWideForCap => "risk_too_wide_for_cap",
            Rejection::InvalidTicks => "invalid_ticks",
        }
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
