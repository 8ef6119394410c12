//! Binary crate for the `quickweather` terminal dashboard.
//!
//! This crate focuses on:
//! - Parsing CLI arguments
//! - The interactive search loop
//! - Human-friendly output formatting

use clap::Parser;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

mod cli;
mod dashboard;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Pick up WEATHER_APIKEY from a local .env file, if present.
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cmd = cli::Cli::parse();
    cmd.run().await
}
