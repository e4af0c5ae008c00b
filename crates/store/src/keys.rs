// In crates/store/src/keys.rs

use chrono::NaiveDate;

/// Singleton flag; present means intake is paused.
pub const PAUSED: &str = "paused";

pub fn ticket(id: &str) -> String {
    format!("ticket:{id}")
}

pub fn code(code: &str) -> String {
    format!("code:{code}")
}

/// Realized loss booked on the given report day.
pub fn daily_loss(day: NaiveDate) -> String {
    format!("loss:{}", day.format("%Y-%m-%d"))
}
