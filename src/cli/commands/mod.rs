//! CLI command implementations.

pub mod check;
pub mod default_config;
pub mod scan;
pub mod symbols;
pub mod validate;

use anyhow::{Context, Result};
use confluence_config::AppConfig;
use confluence_core::traits::MarketDataSource;
use confluence_data::{BinanceConfig, BinanceFuturesSource, CsvCandleSource};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// The exchange, or a CSV directory when one is given.
pub fn build_source(config: &AppConfig, data_dir: Option<&Path>) -> Result<Arc<dyn MarketDataSource>> {
    let source: Arc<dyn MarketDataSource> = match data_dir {
        Some(dir) => Arc::new(
            CsvCandleSource::new(dir)
                .with_context(|| format!("Cannot read data directory {}", dir.display()))?,
        ),
        None => Arc::new(
            BinanceFuturesSource::new(BinanceConfig {
                base_url: config.exchange.base_url.clone(),
                api_key: config.exchange.api_key(),
                request_timeout: config.exchange.request_timeout(),
            })
            .context("Failed to create exchange client")?,
        ),
    };

    info!(source = source.name(), "Market data source ready");
    Ok(source)
}
