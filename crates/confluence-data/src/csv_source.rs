//! Offline candle source backed by a directory of CSV files.
//!
//! Each symbol lives in `<dir>/<SYMBOL>.csv` with a header row. Column names
//! are matched loosely (`Date`/`timestamp`, `Close`/`Adj Close`, ...) and
//! volume may be omitted.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use confluence_core::error::DataError;
use confluence_core::traits::MarketDataSource;
use confluence_core::types::{Bar, CandleSeries, Symbol, Timeframe};
use csv::ReaderBuilder;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, Deserialize)]
struct CsvRecord {
    #[serde(alias = "Date", alias = "date", alias = "timestamp", alias = "Timestamp", alias = "open_time")]
    date: String,
    #[serde(alias = "Open", alias = "open")]
    open: f64,
    #[serde(alias = "High", alias = "high")]
    high: f64,
    #[serde(alias = "Low", alias = "low")]
    low: f64,
    #[serde(alias = "Close", alias = "close", alias = "Adj Close")]
    close: f64,
    #[serde(alias = "Volume", alias = "volume", default)]
    volume: f64,
}

/// Reads candles from `<dir>/<SYMBOL>.csv`.
#[derive(Debug, Clone)]
pub struct CsvCandleSource {
    dir: PathBuf,
}

impl CsvCandleSource {
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, DataError> {
        let dir = dir.into();
        if !dir.is_dir() {
            return Err(DataError::Connection(format!(
                "data directory not found: {}",
                dir.display()
            )));
        }
        Ok(Self { dir })
    }

    fn path_for(&self, symbol: &Symbol) -> PathBuf {
        self.dir.join(format!("{}.csv", symbol))
    }

    fn load_bars(&self, path: &Path) -> Result<Vec<Bar>, DataError> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_path(path)
            .map_err(|e| DataError::Parse(e.to_string()))?;

        let mut bars = Vec::new();
        for result in reader.deserialize() {
            let record: CsvRecord = result.map_err(|e| DataError::Parse(e.to_string()))?;
            bars.push(Bar::new(
                parse_timestamp(&record.date)?,
                record.open,
                record.high,
                record.low,
                record.close,
                record.volume,
            ));
        }

        bars.sort_by_key(|b| b.timestamp);
        Ok(bars)
    }
}

#[async_trait]
impl MarketDataSource for CsvCandleSource {
    async fn fetch_candles(
        &self,
        symbol: &Symbol,
        timeframe: Timeframe,
        limit: usize,
    ) -> Result<CandleSeries, DataError> {
        let path = self.path_for(symbol);
        if !path.is_file() {
            return Err(DataError::SymbolNotFound(symbol.to_string()));
        }

        let bars = self.load_bars(&path)?;
        if bars.is_empty() {
            return Err(DataError::NoDataAvailable);
        }
        debug!(symbol = %symbol, bars = bars.len(), path = %path.display(), "Loaded CSV candles");

        let mut series = CandleSeries::new(symbol.clone(), timeframe, bars)?;
        series.truncate_to_latest(limit);
        Ok(series)
    }

    async fn list_tradable_symbols(&self) -> Result<Vec<Symbol>, DataError> {
        let entries = std::fs::read_dir(&self.dir).map_err(|e| DataError::Connection(e.to_string()))?;

        let mut symbols: Vec<Symbol> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.extension().is_some_and(|ext| ext == "csv"))
            .filter_map(|path| path.file_stem().and_then(|s| s.to_str()).map(Symbol::from))
            .collect();
        symbols.sort();
        Ok(symbols)
    }

    fn name(&self) -> &str {
        "csv"
    }
}

/// Parse an RFC 3339 string, a date, a datetime or a Unix timestamp into epoch milliseconds.
fn parse_timestamp(date_str: &str) -> Result<i64, DataError> {
    const DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y/%m/%d %H:%M"];
    const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d-%m-%Y"];

    let s = date_str.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.timestamp_millis());
    }
    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
            return Ok(dt.and_utc().timestamp_millis());
        }
    }
    for format in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, format) {
            return Ok(d.and_time(NaiveTime::MIN).and_utc().timestamp_millis());
        }
    }

    // Unix timestamps: more than 10 digits means milliseconds
    if let Ok(ts) = s.parse::<i64>() {
        return Ok(if ts > 10_000_000_000 { ts } else { ts * 1000 });
    }

    Err(DataError::Parse(format!("Could not parse date: {}", date_str)))
}
