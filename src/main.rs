//! Confluence signal scanner CLI.

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{commands, Cli, Commands};
use confluence_config::{load_config, AppConfig, LoggingConfig};
use confluence_monitor::{setup_logging, LogFormat, WorkerGuard};
use std::path::Path;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match &cli.command {
        Commands::DefaultConfig => commands::default_config::run(),
        Commands::ValidateConfig => {
            let _guard = init_logging(&cli, &LoggingConfig::default())?;
            commands::validate::run(&cli.config)
        }
        Commands::Scan(args) => {
            let config = load(&cli)?;
            let _guard = init_logging(&cli, &config.logging)?;
            commands::scan::run(args, &config).await
        }
        Commands::Check(args) => {
            let config = load(&cli)?;
            let _guard = init_logging(&cli, &config.logging)?;
            commands::check::run(args, &config).await
        }
        Commands::Symbols(args) => {
            let config = load(&cli)?;
            let _guard = init_logging(&cli, &config.logging)?;
            commands::symbols::run(args, &config).await
        }
    }
}

fn load(cli: &Cli) -> Result<AppConfig> {
    load_config(&cli.config)
        .with_context(|| format!("Failed to load configuration from {}", cli.config.display()))
}

/// Command-line flags win over the configuration file.
fn init_logging(cli: &Cli, logging: &LoggingConfig) -> Result<Option<WorkerGuard>> {
    let level = cli
        .log_level
        .as_ref()
        .map(|l| l.as_str())
        .unwrap_or(logging.level.as_str());
    let format = if cli.json_logs {
        LogFormat::Json
    } else {
        logging
            .format
            .parse()
            .map_err(anyhow::Error::msg)
            .context("Invalid logging.format")?
    };

    setup_logging(level, format, logging.file.as_deref().map(Path::new))
        .context("Failed to initialise logging")
}
