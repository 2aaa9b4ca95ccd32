//! OHLCV (Open, High, Low, Close, Volume) data types.

use serde::{Deserialize, Serialize};

use super::{Symbol, Timeframe};
use crate::error::DataError;

/// A single candle. Uses f64 for fast indicator calculations.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    /// Open time, Unix milliseconds
    pub timestamp: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Bar {
    /// Create a new bar.
    pub fn new(timestamp: i64, open: f64, high: f64, low: f64, close: f64, volume: f64) -> Self {
        Self {
            timestamp,
            open,
            high,
            low,
            close,
            volume,
        }
    }
}

/// Candles for one symbol at a fixed interval, ordered oldest to newest.
///
/// Timestamps are strictly increasing; this is checked on construction.
/// Gaps between bars are not.
#[derive(Debug, Clone)]
pub struct CandleSeries {
    symbol: Symbol,
    timeframe: Timeframe,
    bars: Vec<Bar>,
}

impl CandleSeries {
    /// Build a series, rejecting bars whose timestamps do not strictly increase.
    pub fn new(symbol: Symbol, timeframe: Timeframe, bars: Vec<Bar>) -> Result<Self, DataError> {
        for (index, pair) in bars.windows(2).enumerate() {
            if pair[1].timestamp <= pair[0].timestamp {
                return Err(DataError::Unordered {
                    index: index + 1,
                    previous: pair[0].timestamp,
                    timestamp: pair[1].timestamp,
                });
            }
        }

        Ok(Self {
            symbol,
            timeframe,
            bars,
        })
    }

    pub fn symbol(&self) -> &Symbol {
        &self.symbol
    }

    pub fn timeframe(&self) -> Timeframe {
        self.timeframe
    }

    /// Get the number of bars.
    #[inline]
    pub fn len(&self) -> usize {
        self.bars.len()
    }

    /// Check if the series is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// Get all bars as a slice.
    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    /// Get the newest bar.
    pub fn last(&self) -> Option<&Bar> {
        self.bars.last()
    }

    /// Keep only the newest `limit` bars.
    pub fn truncate_to_latest(&mut self, limit: usize) {
        if self.bars.len() > limit {
            self.bars.drain(..self.bars.len() - limit);
        }
    }

    /// Extract close prices as a vector.
    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    /// Extract high prices as a vector.
    pub fn highs(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.high).collect()
    }

    /// Extract low prices as a vector.
    pub fn lows(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.low).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bar(ts: i64, close: f64) -> Bar {
        Bar::new(ts, close, close + 1.0, close - 1.0, close, 1000.0)
    }

    #[test]
    fn test_series_rejects_unordered_bars() {
        let bars = vec![bar(1, 100.0), bar(3, 101.0), bar(2, 102.0)];
        let err = CandleSeries::new("BTCUSDT".into(), Timeframe::Hour1, bars).unwrap_err();

        assert_eq!(
            err,
            DataError::Unordered {
                index: 2,
                previous: 3,
                timestamp: 2
            }
        );
    }

    #[test]
    fn test_series_rejects_duplicate_timestamps() {
        let bars = vec![bar(1, 100.0), bar(1, 101.0)];
        assert!(CandleSeries::new("BTCUSDT".into(), Timeframe::Hour1, bars).is_err());
    }

    #[test]
    fn test_series_extractions() {
        let bars = vec![bar(1, 100.5), bar(2, 101.5)];
        let series = CandleSeries::new("ETHUSDT".into(), Timeframe::Hour1, bars).unwrap();

        assert_eq!(series.closes(), vec![100.5, 101.5]);
        assert_eq!(series.highs(), vec![101.5, 102.5]);
        assert_eq!(series.lows(), vec![99.5, 100.5]);
        assert_eq!(series.last().unwrap().timestamp, 2);
    }

    #[test]
    fn test_truncate_keeps_newest() {
        let bars = (0..10).map(|i| bar(i, 100.0 + i as f64)).collect();
        let mut series = CandleSeries::new("BTCUSDT".into(), Timeframe::Hour1, bars).unwrap();

        series.truncate_to_latest(3);
        assert_eq!(series.len(), 3);
        assert_eq!(series.bars()[0].timestamp, 7);

        series.truncate_to_latest(5);
        assert_eq!(series.len(), 3);
    }
}
