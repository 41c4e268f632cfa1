//! EmuController CLI
//!
//! Runs the virtual controller or inspects it through its request interface.

use anyhow::Result;
use clap::Parser;
use tracing::info;

use emu_controller::ControllerConfig;

mod cli;
use cli::{Cli, Commands, ConfigCommands};

mod commands;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config_path = cli.config.unwrap_or_else(ControllerConfig::default_path);

    let load = || -> Result<ControllerConfig> {
        info!("Loading config from {:?}", config_path);
        Ok(ControllerConfig::load(&config_path)?)
    };

    match cli.command {
        Commands::Run {
            duration_secs,
            feed_interval_ms,
        } => commands::run::run(&load()?, duration_secs, feed_interval_ms).await,
        Commands::Descriptor { json } => commands::inspect::descriptor(&load()?, json),
        Commands::Scenario { json } => commands::inspect::scenario(&load()?, json),
        Commands::Config(ConfigCommands::Init { force }) => {
            commands::config::init(&config_path, force)
        }
        Commands::Config(ConfigCommands::Show) => commands::config::show(&load()?),
    }
}
