// In crates/risk/src/lib.rs

use rust_decimal::Decimal;

pub mod error;
pub mod instruments;
pub mod sizer;
pub mod types;

// Re-export public types
pub use error::{Error, Result};
pub use instruments::{normalize, spec_for, InstrumentSpec};
pub use sizer::{size, DailyCapSizer};
pub use types::{Rejection, RiskSettings, Sizing};

/// The universal interface for a position sizing module.
///
/// A `RiskManager` turns an entry/stop pair into a contract quantity that
/// fits inside the configured loss budget, or vetoes the trade.
pub trait RiskManager: Send + Sync {
    /// The name of the risk management strategy.
    fn name(&self) -> &'static str;

    /// Sizes a trade against the loss budget.
    ///
    /// # Arguments
    ///
    /// * `symbol`: The raw symbol from the alert, contract month included.
    /// * `entry`: The planned entry price.
    /// * `stop`: The protective stop price.
    /// * `daily_loss_used`: Realized loss already booked against today's cap.
    ///
    /// # Returns
    ///
    /// * `Ok(Sizing)`: The quantity and per-contract risk.
    /// * `Err(Error::Vetoed)`: The trade does not fit, with the reason.
    fn evaluate(
        &self,
        symbol: &str,
        entry: Decimal,
        stop: Decimal,
        daily_loss_used: Decimal,
    ) -> Result<Sizing>;
}
