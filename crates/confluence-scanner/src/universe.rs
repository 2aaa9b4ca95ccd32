//! Symbol universe discovery, run once at startup.

use confluence_core::error::StartupError;
use confluence_core::traits::MarketDataSource;
use confluence_core::types::Symbol;
use tracing::info;

#[derive(Debug, Clone)]
pub struct UniverseSettings {
    /// Listed symbols are kept when their name contains this string.
    pub quote_asset: String,
    /// When non-empty, used verbatim instead of asking the source.
    pub symbols: Vec<Symbol>,
}

impl Default for UniverseSettings {
    fn default() -> Self {
        Self {
            quote_asset: "USDT".to_string(),
            symbols: Vec::new(),
        }
    }
}

/// Resolve the ordered, duplicate-free list of symbols to scan.
pub async fn discover_universe(
    source: &dyn MarketDataSource,
    settings: &UniverseSettings,
) -> Result<Vec<Symbol>, StartupError> {
    let candidates: Vec<Symbol> = if settings.symbols.is_empty() {
        source
            .list_tradable_symbols()
            .await?
            .into_iter()
            .filter(|s| s.as_str().contains(settings.quote_asset.as_str()))
            .collect()
    } else {
        settings.symbols.clone()
    };

    let mut universe: Vec<Symbol> = Vec::with_capacity(candidates.len());
    for symbol in candidates {
        if !universe.contains(&symbol) {
            universe.push(symbol);
        }
    }

    if universe.is_empty() {
        return Err(StartupError::EmptyUniverse);
    }

    info!(
        source = source.name(),
        symbol_count = universe.len(),
        fixed = !settings.symbols.is_empty(),
        "Symbol universe resolved"
    );
    Ok(universe)
}
