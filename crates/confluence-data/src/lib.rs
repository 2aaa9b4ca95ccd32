//! Market data sources.
//!
//! - [`BinanceFuturesSource`]: USDⓈ-M futures REST API
//! - [`CsvCandleSource`]: a directory of per-symbol CSV files, for offline runs

mod binance;
mod csv_source;

pub use binance::{BinanceConfig, BinanceFuturesSource};
pub use csv_source::CsvCandleSource;
