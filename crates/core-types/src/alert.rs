// In crates/core-types/src/alert.rs

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::str::FromStr;

/// An inbound trade signal from a charting webhook.
///
/// Alert sources are loose about types, so every field is read leniently:
/// text fields accept strings or numbers, and `entry`/`stop` are only
/// populated when they carry a numeric `price`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct AlertPayload {
    #[serde(default, deserialize_with = "de_text")]
    pub symbol: String,
    #[serde(default, deserialize_with = "de_text")]
    pub side: String,
    #[serde(default, deserialize_with = "de_opt_text")]
    pub timeframe: Option<String>,
    #[serde(default, deserialize_with = "de_level_price")]
    pub entry: Option<Decimal>,
    #[serde(default, deserialize_with = "de_level_price")]
    pub stop: Option<Decimal>,
    #[serde(default, deserialize_with = "de_text")]
    pub strategy: String,
    #[serde(default, deserialize_with = "de_text")]
    pub note: String,
}

impl AlertPayload {
    /// Reads a payload out of an arbitrary JSON value. Anything that is not
    /// an object yields the empty payload.
    pub fn from_value(value: Value) -> Self {
        serde_json::from_value(value).unwrap_or_default()
    }
}

fn scalar_text(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    }
}

pub(crate) fn de_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(scalar_text(Value::deserialize(deserializer)?).unwrap_or_default())
}

fn de_opt_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(scalar_text(Value::deserialize(deserializer)?).filter(|s| !s.is_empty()))
}

/// `{"price": <number>}` -> `Some(price)`; anything else -> `None`.
fn de_level_price<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value
        .get("price")
        .and_then(|p| p.as_number())
        .and_then(|n| {
            let text = n.to_string();
            Decimal::from_str(&text)
                .or_else(|_| Decimal::from_scientific(&text))
                .ok()
        }))
}
