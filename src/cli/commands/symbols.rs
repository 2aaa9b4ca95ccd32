//! List the symbol universe.

use anyhow::Result;
use confluence_config::AppConfig;
use confluence_scanner::discover_universe;

use super::build_source;
use crate::cli::SymbolsArgs;

pub async fn run(args: &SymbolsArgs, config: &AppConfig) -> Result<()> {
    let source = build_source(config, args.data_dir.as_deref())?;
    let universe = discover_universe(source.as_ref(), &config.scanner.universe_settings()).await?;
    let exclusions = config.scanner.scanner_settings(None).exclusions;

    for symbol in &universe {
        if exclusions.contains(symbol) {
            println!("{} (excluded)", symbol);
        } else {
            println!("{}", symbol);
        }
    }
    println!();
    println!("{} symbols", universe.len());

    Ok(())
}
