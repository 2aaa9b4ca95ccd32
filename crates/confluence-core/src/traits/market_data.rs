//! Market data source trait.

use async_trait::async_trait;

use crate::error::DataError;
use crate::types::{CandleSeries, Symbol, Timeframe};

/// Source of candles and of the tradable symbol list.
#[async_trait]
pub trait MarketDataSource: Send + Sync {
    /// Fetch the newest `limit` candles for a symbol.
    ///
    /// # Returns
    /// A series ordered from oldest to newest, at most `limit` bars long.
    async fn fetch_candles(
        &self,
        symbol: &Symbol,
        timeframe: Timeframe,
        limit: usize,
    ) -> Result<CandleSeries, DataError>;

    /// List every symbol currently tradable on the source.
    async fn list_tradable_symbols(&self) -> Result<Vec<Symbol>, DataError>;

    /// Get the data source name.
    fn name(&self) -> &str;
}
