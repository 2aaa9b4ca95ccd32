//! Print the default configuration.

use anyhow::{Context, Result};
use confluence_config::default_config_toml;

pub fn run() -> Result<()> {
    let rendered = default_config_toml().context("Failed to render default configuration")?;
    print!("{}", rendered);
    Ok(())
}
