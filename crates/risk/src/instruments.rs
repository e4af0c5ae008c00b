// In crates/risk/src/instruments.rs

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Contract specification for a futures root.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InstrumentSpec {
    pub tick_size: Decimal,
    pub dollar_per_tick: Decimal,
}

// Micro roots come first: "MES..." starts with "ES" only after the "M".
const ROOT_PRIORITY: [&str; 7] = ["MES", "MNQ", "MGC", "ES", "NQ", "GC", "CL"];

/// Maps a broker symbol (e.g. `MESZ5`, `es1!`) to its root.
///
/// Unknown symbols come back uppercased but otherwise unchanged; `spec_for`
/// will not find them.
pub fn normalize(raw: &str) -> String {
    let upper = raw.trim().to_uppercase();
    ROOT_PRIORITY
        .iter()
        .find(|root| upper.starts_with(*root))
        .map(|root| root.to_string())
        .unwrap_or(upper)
}

/// Looks up the tick specification of a root symbol.
pub fn spec_for(root: &str) -> Option<InstrumentSpec> {
    let (tick_size, dollar_per_tick) = match root {
        "ES" => (dec!(0.25), dec!(12.5)),
        "MES" => (dec!(0.25), dec!(1.25)),
        "NQ" => (dec!(0.25), dec!(5.0)),
        "MNQ" => (dec!(0.25), dec!(0.5)),
        "GC" => (dec!(0.1), dec!(10.0)),
        "MGC" => (dec!(0.1), dec!(1.0)),
        "CL" => (dec!(0.01), dec!(10.0)),
        _ => return None,
    };
    Some(InstrumentSpec { tick_size, dollar_per_tick })
}
