// In crates/app-config/src/types.rs

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::{Error, Result};
use risk::types::RiskSettings;

#[derive(Deserialize, Debug, Clone)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

#[derive(Deserialize, Debug, Clone)]
pub struct Settings {
    /// The application's general settings.
    pub app: AppSettings,
    pub server: ServerSettings,
    /// Loss-budget settings for the sizing engine.
    #[serde(default)]
    pub risk: RiskSettings,
    /// Alert webhook settings.
    pub alerts: AlertSettings,
    #[serde(default)]
    pub tickets: TicketSettings,
    /// Settings for the key-value store.
    pub store: StoreSettings,
    /// Settings for the SMS channel.
    pub notifier: NotifierSettings,
}

#[derive(Deserialize, Debug, Clone)]
pub struct AppSettings {
    /// The environment the application is running in (e.g., "development", "production").
    pub environment: String,
    /// The log level for the application.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

#[derive(Deserialize, Debug, Clone)]
pub struct AlertSettings {
    /// Shared secret expected in the `x-alert-secret` header.
    pub secret: String,
    /// Symbols (or roots) that may open tickets.
    #[serde(default)]
    pub symbol_whitelist: Vec<String>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct TicketSettings {
    /// How many fresh ids to try when a short code is held by a pending
    /// ticket. Zero keeps the first code unconditionally.
    #[serde(default = "default_code_collision_retries")]
    pub code_collision_retries: u32,
}

impl Default for TicketSettings {
    fn default() -> Self {
        Self { code_collision_retries: default_code_collision_retries() }
    }
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// Process-local map. Lost on restart; meant for development and tests.
    Memory,
    /// Upstash Redis over its REST API.
    Upstash,
}

#[derive(Deserialize, Debug, Clone)]
pub struct StoreSettings {
    pub backend: StoreBackend,
    /// The REST endpoint of the Upstash database.
    pub url: Option<String>,
    /// The REST bearer token.
    pub token: Option<String>,
    #[serde(default = "default_store_timeout")]
    pub timeout_secs: u64,
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum NotifierBackend {
    /// Messages are logged and kept in memory, never sent.
    Log,
    Twilio,
}

#[derive(Deserialize, Debug, Clone)]
pub struct NotifierSettings {
    pub backend: NotifierBackend,
    pub account_sid: Option<String>,
    pub auth_token: Option<String>,
    pub messaging_service_sid: Option<String>,
    #[serde(default = "default_twilio_base_url")]
    pub api_base_url: String,
    /// Operator phone numbers. Every recipient may send commands.
    #[serde(default)]
    pub recipients: Vec<String>,
    #[serde(default = "default_notifier_timeout")]
    pub timeout_secs: u64,
}

impl Settings {
    /// Rejects configurations the relay cannot run with.
    pub fn validate(&self) -> Result<()> {
        let risk = &self.risk;
        if risk.trailing_cushion <= Decimal::ZERO {
            return Err(Error::Invalid("risk.trailing_cushion must be positive".into()));
        }
        for (name, value) in [
            ("risk.use_pct_of_cushion", risk.use_pct_of_cushion),
            ("risk.per_trade_pct_of_daily", risk.per_trade_pct_of_daily),
        ] {
            if value <= Decimal::ZERO || value > Decimal::ONE {
                return Err(Error::Invalid(format!("{name} must be in (0, 1], got {value}")));
            }
        }
        if risk.report_utc_offset_minutes.abs() >= 24 * 60 {
            return Err(Error::Invalid("risk.report_utc_offset_minutes must be under 24h".into()));
        }

        if self.alerts.secret.trim().is_empty() {
            return Err(Error::Invalid("alerts.secret must be set".into()));
        }

        if self.store.backend == StoreBackend::Upstash
            && (is_blank(&self.store.url) || is_blank(&self.store.token))
        {
            return Err(Error::Invalid("store.url and store.token are required for upstash".into()));
        }

        let notifier = &self.notifier;
        if !notifier.recipients.iter().any(|r| !r.trim().is_empty()) {
            return Err(Error::Invalid("notifier.recipients must list at least one number".into()));
        }
        if notifier.backend == NotifierBackend::Twilio
            && (is_blank(&notifier.account_sid)
                || is_blank(&notifier.auth_token)
                || is_blank(&notifier.messaging_service_sid))
        {
            return Err(Error::Invalid(
                "notifier.account_sid, auth_token and messaging_service_sid are required for twilio".into(),
            ));
        }

        Ok(())
    }
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, |v| v.trim().is_empty())
}

/// Helper functions for serde defaults
fn default_log_level() -> String { "info".to_string() }
fn default_code_collision_retries() -> u32 { 8 }
fn default_store_timeout() -> u64 { 5 }
fn default_notifier_timeout() -> u64 { 10 }
fn default_twilio_base_url() -> String { "https://api.twilio.com".to_string() }
