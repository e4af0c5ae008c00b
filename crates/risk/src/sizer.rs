// In crates/risk/src/sizer.rs

use crate::instruments::{normalize, spec_for};
use crate::types::{Rejection, RiskSettings, Sizing};
use crate::{Error, Result, RiskManager};
use num_traits::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

/// Sizes a trade so that its total stop risk fits the loss budget.
///
/// All state is passed in. The caller is responsible for reading the
/// realized loss of the current report day.
///
/// 1. Unknown roots are rejected.
/// 2. The stop distance is measured in whole ticks, never less than one.
/// 3. The per-contract risk is never below its whole-dollar rounding, which
///    is what tickets record.
/// 4. The quantity is the number of whole contracts that fit inside the
///    smaller of the remaining daily budget and the per-trade cap.
pub fn size(
    symbol: &str,
    entry: Decimal,
    stop: Decimal,
    daily_cap: Decimal,
    daily_loss_used: Decimal,
    per_trade_fraction: Decimal,
) -> std::result::Result<Sizing, Rejection> {
    let spec = spec_for(&normalize(symbol)).ok_or(Rejection::UnknownInstrument)?;

    let ticks = entry
        .checked_sub(stop)
        .and_then(|distance| distance.abs().checked_div(spec.tick_size))
        .map(|t| t.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero))
        .ok_or(Rejection::InvalidTicks)?
        .max(Decimal::ONE);
    let exact = ticks
        .checked_mul(spec.dollar_per_tick)
        .ok_or(Rejection::InvalidTicks)?;
    let risk_per_contract =
        exact.max(exact.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero));

    // An out-of-range loss counter leaves no budget to size against.
    let remaining = daily_cap
        .checked_sub(daily_loss_used)
        .ok_or(Rejection::DailyCapReached)?
        .max(Decimal::ZERO);
    if remaining <= Decimal::ZERO {
        return Err(Rejection::DailyCapReached);
    }

    let per_trade_cap = daily_cap * per_trade_fraction;
    let budget = per_trade_cap.min(remaining);
    let contracts = (budget / risk_per_contract).floor();
    if contracts < Decimal::ONE {
        return Err(Rejection::RiskTooWideForCap);
    }
    let qty = contracts.to_u32().unwrap_or(u32::MAX);

    Ok(Sizing { qty, ticks, risk_per_contract })
}

/// Sizes trades against a daily cap derived from the trailing cushion.
#[derive(Debug, Clone)]
pub struct DailyCapSizer {
    settings: RiskSettings,
}

impl DailyCapSizer {
    /// Creates a sizer, rejecting settings that cannot produce a budget.
    pub fn new(settings: RiskSettings) -> Result<Self> {
        if settings.daily_cap() <= Decimal::ZERO {
            return Err(Error::InvalidParameters(format!(
                "daily cap must be positive, got {}",
                settings.daily_cap()
            )));
        }
        if settings.per_trade_pct_of_daily <= Decimal::ZERO
            || settings.per_trade_pct_of_daily > Decimal::ONE
        {
            return Err(Error::InvalidParameters(format!(
                "per_trade_pct_of_daily must be in (0, 1], got {}",
                settings.per_trade_pct_of_daily
            )));
        }
        Ok(Self { settings })
    }

    pub fn settings(&self) -> &RiskSettings {
        &self.settings
    }
}

impl RiskManager for DailyCapSizer {
    fn name(&self) -> &'static str {
        "DailyCapSizer"
    }

    fn evaluate(
        &self,
        symbol: &str,
        entry: Decimal,
        stop: Decimal,
        daily_loss_used: Decimal,
    ) -> Result<Sizing> {
        let sizing = size(
            symbol,
            entry,
            stop,
            self.settings.daily_cap(),
            daily_loss_used,
            self.settings.per_trade_pct_of_daily,
        )?;
        tracing::debug!(
            symbol,
            qty = sizing.qty,
            ticks = %sizing.ticks,
            risk_per_contract = %sizing.risk_per_contract,
            "Trade sized."
        );
        Ok(sizing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_es_scenario_fits_one_contract() {
        // $1500 daily cap, 20% per trade = $300. 5 points on ES = 20 ticks = $250.
        let sizing = size("ES", dec!(4500), dec!(4495), dec!(1500), dec!(0), dec!(0.2)).unwrap();

        assert_eq!(sizing.ticks, dec!(20));
        assert_eq!(sizing.risk_per_contract, dec!(250));
        assert_eq!(sizing.qty, 1);
    }

    #[test]
    fn test_exhausted_cap_is_rejected() {
        let result = size("ES", dec!(4500), dec!(4495), dec!(1500), dec!(1500), dec!(0.2));
        assert_eq!(result, Err(Rejection::DailyCapReached));

        // Overspent days stay rejected, even for a one-tick stop.
        let result = size("MES", dec!(4500), dec!(4500), dec!(1500), dec!(2200), dec!(0.2));
        assert_eq!(result, Err(Rejection::DailyCapReached));
    }

    #[test]
    fn test_remaining_budget_binds_before_per_trade_cap() {
        // $1500 cap, $1400 used -> $100 left, below the $300 per-trade cap.
        // 2 points on MES = 8 ticks = $10/contract -> 10 contracts.
        let sizing = size("MESZ5", dec!(4500), dec!(4498), dec!(1500), dec!(1400), dec!(0.2)).unwrap();
        assert_eq!(sizing.risk_per_contract, dec!(10));
        assert_eq!(sizing.qty, 10);
    }

    #[test]
    fn test_identical_prices_floor_at_one_tick() {
        let sizing = size("MNQ", dec!(21000), dec!(21000), dec!(1500), dec!(0), dec!(0.2)).unwrap();
        assert_eq!(sizing.ticks, dec!(1));
        // $0.50 of tick risk is recorded as $1, so size against $1.
        assert_eq!(sizing.risk_per_contract, dec!(1));
        assert_eq!(sizing.qty, 300);
    }

    #[test]
    fn test_recorded_risk_fits_per_trade_cap() {
        // 0.5 points on MES = 2 ticks = $2.50, recorded as $3 -> 100 contracts, $300.
        let sizing = size("MES", dec!(4500), dec!(4499.5), dec!(1500), dec!(0), dec!(0.2)).unwrap();
        assert_eq!(sizing.ticks, dec!(2));
        assert_eq!(sizing.risk_per_contract, dec!(3));
        assert_eq!(sizing.qty, 100);

        let recorded = sizing
            .risk_per_contract
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
        assert!(Decimal::from(sizing.qty) * recorded <= dec!(300));
    }

    #[test]
    fn test_out_of_range_loss_counter_is_rejected() {
        let result = size("ES", dec!(4500), dec!(4495), dec!(1500), Decimal::MIN, dec!(0.2));
        assert_eq!(result, Err(Rejection::DailyCapReached));

        let result = size("ES", dec!(4500), dec!(4495), dec!(1500), Decimal::MAX, dec!(0.2));
        assert_eq!(result, Err(Rejection::DailyCapReached));
    }

    #[test]
    fn test_half_ticks_round_away_from_zero() {
        // 0.125 / 0.25 = 0.5 tick -> 1 tick; 0.375 / 0.25 = 1.5 -> 2 ticks.
        let one = size("ES", dec!(100.125), dec!(100), dec!(1500), dec!(0), dec!(0.2)).unwrap();
        let two = size("ES", dec!(100), dec!(100.375), dec!(1500), dec!(0), dec!(0.2)).unwrap();
        assert_eq!(one.ticks, dec!(1));
        assert_eq!(two.ticks, dec!(2));
    }

    #[test]
    fn test_wide_stop_is_rejected() {
        // 30 points on ES = $1500/contract, far above a $300 per-trade cap.
        let result = size("ES", dec!(4500), dec!(4470), dec!(1500), dec!(0), dec!(0.2));
        assert_eq!(result, Err(Rejection::RiskTooWideForCap));
    }

    #[test]
    fn test_unknown_instrument_is_rejected() {
        let result = size("ZB", dec!(110), dec!(109), dec!(1500), dec!(0), dec!(0.2));
        assert_eq!(result, Err(Rejection::UnknownInstrument));
    }

    #[test]
    fn test_total_risk_never_exceeds_budget() {
        let cap = dec!(1500);
        let fraction = dec!(0.2);
        for symbol in ["ES", "MES", "NQ", "MNQ", "GC", "MGC", "CL"] {
            for used in [dec!(0), dec!(700), dec!(1250), dec!(1499.99)] {
                for distance in [dec!(0), dec!(0.01), dec!(0.3), dec!(0.5), dec!(1.75), dec!(4), dec!(12.5)] {
                    let entry = dec!(2000);
                    match size(symbol, entry, entry - distance, cap, used, fraction) {
                        Ok(sizing) => {
                            let budget = (cap * fraction).min(cap - used);
                            assert!(sizing.qty >= 1);
                            assert!(sizing.ticks >= dec!(1));
                            let recorded = sizing
                                .risk_per_contract
                                .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
                            assert!(
                                sizing.total_risk() <= budget,
                                "{symbol} used={used} distance={distance}: {sizing:?}"
                            );
                            assert!(Decimal::from(sizing.qty) * recorded <= budget);
                        }
                        Err(reason) => assert_eq!(reason, Rejection::RiskTooWideForCap),
                    }
                }
            }
        }
    }

    #[test]
    fn test_sizer_vetoes_with_reason() {
        let sizer = DailyCapSizer::new(RiskSettings::default()).unwrap();
        assert_eq!(sizer.settings().daily_cap(), dec!(1500));

        let err = sizer.evaluate("ES", dec!(4500), dec!(4495), dec!(1500)).unwrap_err();
        assert_eq!(err, Error::Vetoed { reason: Rejection::DailyCapReached });
        assert!(err.to_string().contains("daily_cap_reached"));
    }

    #[test]
    fn test_sizer_rejects_empty_budget() {
        let settings = RiskSettings { trailing_cushion: dec!(0), ..RiskSettings::default() };
        assert!(matches!(DailyCapSizer::new(settings), Err(Error::InvalidParameters(_))));
    }
}
