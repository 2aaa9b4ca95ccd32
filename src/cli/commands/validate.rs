//! Validate configuration command.

use anyhow::Result;
use confluence_config::load_config;
use std::path::Path;

pub fn run(config_path: &Path) -> Result<()> {
    println!("Validating configuration: {:?}", config_path);

    let config = match load_config(config_path) {
        Ok(config) => config,
        Err(e) => {
            println!("Configuration error: {}", e);
            return Err(e.into());
        }
    };
    if let Err(e) = config.validate() {
        println!("Configuration error: {}", e);
        return Err(e.into());
    }

    println!("Configuration is valid!");
    println!();
    println!("App: {}", config.app.name);
    println!("Environment: {}", config.app.environment);
    println!("Log level: {}", config.logging.level);
    println!("Exchange: {}", config.exchange.base_url);
    println!("Timeframe: {}", config.scanner.timeframe);
    println!("Candles per fetch: {}", config.scanner.limit);
    println!("Cycle delay: {}s", config.scanner.cycle_delay_secs);
    println!("Subscribers: {}", config.telegram.subscribers.len());
    if config.telegram.token().is_err() {
        println!(
            "Warning: {} is not set; only `scan --dry-run` will work",
            config.telegram.token_env
        );
    }

    Ok(())
}
