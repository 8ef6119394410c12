use clap::{Parser, Subcommand};
use quickweather_core::{Config, store};

use crate::dashboard;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "quickweather", version, about = "Local time and weather dashboard")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the interactive dashboard. This is the default.
    Dashboard,

    /// Create the search history database and table.
    Init {
        /// Delete and recreate the database file first.
        #[arg(long)]
        force: bool,
    },

    /// Store the provider API key in the config file.
    Configure,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command.unwrap_or(Command::Dashboard) {
            Command::Dashboard => dashboard::run(Config::load()?).await,
            Command::Init { force } => init(force),
            Command::Configure => configure(),
        }
    }
}

fn init(force: bool) -> anyhow::Result<()> {
    let config = Config::load()?;
    store::init_database(&config.db_path, force)?;
    println!("Database '{}' initiated successfully.", config.db_path.display());

    Ok(())
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let api_key = inquire::Password::new("OpenWeatherMap API key:")
        .without_confirmation()
        .prompt()?;
    config.set_api_key(api_key);
    config.save()?;

    println!("API key saved to {}", Config::config_file_path()?.display());

    Ok(())
}
