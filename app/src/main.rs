// In app/src/main.rs

use anyhow::{Context, Result};
use app_config::Settings;
use clap::{Parser, Subcommand};
use engine::{Relay, RiskLedger};
use risk::{DailyCapSizer, RiskManager};
use rust_decimal::Decimal;
use std::str::FromStr;
use tracing_subscriber::prelude::*;
use web_server::AppState;

// --- Command-Line Interface Definition ---

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = "Relays trade alerts to an operator over SMS, sized to a daily loss cap.")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Serves the alert and inbound SMS webhooks.
    Serve,

    /// Prints today's loss budget and the pause flag.
    Status,

    /// Sizes a trade against the configured caps without opening a ticket.
    Size {
        /// The contract symbol (e.g., "ES", "MESZ5").
        #[arg(short, long)]
        symbol: String,

        #[arg(long)]
        entry: Decimal,

        #[arg(long)]
        stop: Decimal,

        /// Realized loss already booked today.
        #[arg(long, default_value = "0")]
        loss_used: Decimal,
    },
}

// --- Main Application Entry Point ---

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from a .env file, if it exists.
    dotenvy::dotenv().ok();

    // Parse command-line arguments.
    let cli = Cli::parse();

    let settings = app_config::load_settings().context("Failed to load configuration")?;
    init_tracing(&settings.app.log_level);

    tracing::info!(environment = %settings.app.environment, "Starting tradegate");

    match cli.command {
        Commands::Serve => serve(settings).await?,
        Commands::Status => print_status(&settings).await?,
        Commands::Size { symbol, entry, stop, loss_used } => {
            print_sizing(&settings, &symbol, entry, stop, loss_used)?
        }
    }

    Ok(())
}

fn init_tracing(log_level: &str) {
    let level = tracing::Level::from_str(log_level).unwrap_or(tracing::Level::INFO);
    let fmt_layer = tracing_subscriber::fmt::layer().with_filter(
        tracing_subscriber::filter::Targets::new()
            .with_target("hyper", tracing::Level::WARN)
            .with_target("reqwest", tracing::Level::WARN)
            .with_default(level),
    );
    tracing_subscriber::registry().with(fmt_layer).init();
}

async fn serve(settings: Settings) -> Result<()> {
    let store = store::connect(&settings.store)?;
    let notifier = messaging::new(&settings.notifier)?;
    let relay = Relay::new(&settings, store, notifier)?;

    let state = AppState::new(relay, &settings.alerts.secret);
    web_server::run(&settings.server, state).await?;
    Ok(())
}

async fn print_status(settings: &Settings) -> Result<()> {
    let store = store::connect(&settings.store)?;
    let ledger = RiskLedger::new(store, settings.risk.clone());
    let snapshot = ledger.snapshot().await?;
    println!("{}", serde_json::to_string_pretty(&snapshot)?);
    Ok(())
}

fn print_sizing(settings: &Settings, symbol: &str, entry: Decimal, stop: Decimal, loss_used: Decimal) -> Result<()> {
    let sizer = DailyCapSizer::new(settings.risk.clone())?;
    match sizer.evaluate(symbol, entry, stop, loss_used) {
        Ok(sizing) => println!(
            "{} QTY {} • {} ticks • ${} per contract • ${} total risk",
            symbol.to_uppercase(),
            sizing.qty,
            sizing.ticks,
            sizing.risk_per_contract,
            sizing.total_risk()
        ),
        Err(risk::Error::Vetoed { reason }) => println!("filtered: {reason}"),
        Err(e) => return Err(e.into()),
    }
    Ok(())
}
