// In crates/app-config/src/lib.rs

use config::{Config, Environment, File};
use std::path::Path;

pub mod error;
pub mod types;

// Re-export the most important types for easy access.
pub use error::{Error, Result};
pub use types::{
    AlertSettings, AppSettings, NotifierBackend, NotifierSettings, ServerSettings, Settings,
    StoreBackend, StoreSettings, TicketSettings,
};

/// Loads the application settings from the `config/` directory.
pub fn load_settings() -> Result<Settings> {
    load_settings_from(Path::new("config"))
}

/// Loads the application settings from various sources.
///
/// This function orchestrates the layered configuration loading:
/// 1. Reads from a default `base.toml` file.
/// 2. Merges settings from an environment-specific file (e.g., `development.toml`).
/// 3. Merges settings from environment variables.
///
/// The merged settings are validated before they are returned.
pub fn load_settings_from(dir: &Path) -> Result<Settings> {
    // Get the current environment. Default to "development" if not set.
    let environment = std::env::var("APP_ENVIRONMENT").unwrap_or_else(|_| "development".into());

    let base = dir.join("base");
    let overlay = dir.join(&environment);

    let settings = Config::builder()
        // 1. Load the base configuration file.
        .add_source(File::with_name(&base.to_string_lossy()))
        // 2. Load the environment-specific configuration file.
        .add_source(File::with_name(&overlay.to_string_lossy()).required(false))
        // 3. Load settings from environment variables (e.g., `APP_ALERTS__SECRET=...`).
        // The prefix is `APP_`, separator is `__`, lists are comma separated.
        .add_source(
            Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("alerts.symbol_whitelist")
                .with_list_parse_key("notifier.recipients")
                .try_parsing(true),
        )
        .build()?;

    // Deserialize the configuration into our `Settings` struct.
    let settings: Settings = settings.try_deserialize()?;
    settings.validate()?;

    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::fs;

    const BASE: &str = r#"
[app]
environment = "test"

[server]
host = "127.0.0.1"
port = 8080

[risk]
trailing_cushion = 2500
use_pct_of_cushion = 0.4

[alerts]
secret = "s3cret"
symbol_whitelist = ["ES", "MNQ"]

[store]
backend = "memory"

[notifier]
backend = "log"
recipients = ["+15550001111"]
"#;

    fn load(base: &str) -> Result<Settings> {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("base.toml"), base).unwrap();
        load_settings_from(dir.path())
    }

    #[test]
    fn loads_base_file_with_defaults() {
        let settings = load(BASE).unwrap();

        assert_eq!(settings.risk.daily_cap(), dec!(1000));
        assert_eq!(settings.risk.per_trade_pct_of_daily, dec!(0.2));
        assert_eq!(settings.tickets.code_collision_retries, 8);
        assert_eq!(settings.store.backend, StoreBackend::Memory);
        assert_eq!(settings.notifier.api_base_url, "https://api.twilio.com");
        assert_eq!(settings.alerts.symbol_whitelist, vec!["ES", "MNQ"]);
        assert_eq!(settings.app.log_level, "info");
    }

    #[test]
    fn rejects_missing_twilio_credentials() {
        let base = BASE.replace("backend = \"log\"", "backend = \"twilio\"");
        let err = load(&base).unwrap_err();
        assert!(matches!(err, Error::Invalid(msg) if msg.contains("twilio")));
    }

    #[test]
    fn rejects_fraction_above_one() {
        let base = BASE.replace("use_pct_of_cushion = 0.4", "use_pct_of_cushion = 1.5");
        let err = load(&base).unwrap_err();
        assert!(matches!(err, Error::Invalid(msg) if msg.contains("use_pct_of_cushion")));
    }

    #[test]
    fn rejects_upstash_without_token() {
        let base = BASE.replace(
            "backend = \"memory\"",
            "backend = \"upstash\"\nurl = \"https://eu1.upstash.io\"",
        );
        assert!(matches!(load(&base), Err(Error::Invalid(_))));
    }
}
