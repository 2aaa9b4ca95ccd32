//! Latest-value indicator readings for one symbol.

use serde::{Deserialize, Serialize};

/// Indicator values for one symbol in one cycle.
///
/// Only the newest one or two points of each series are kept, so anything
/// consuming a snapshot is O(1) in the length of the candle window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSnapshot {
    /// Fast EMA of close (50)
    pub ema_fast: f64,
    /// Slow EMA of close (200)
    pub ema_slow: f64,
    /// RSI(14) of close
    pub rsi_latest: f64,
    /// Ichimoku leading span A
    pub ichimoku_a: f64,
    /// Ichimoku leading span B
    pub ichimoku_b: f64,
    /// On-balance-volume change over the newest bar
    pub obv_delta: f64,
    /// MACD histogram at the newest bar
    pub macd_hist_latest: f64,
    /// MACD histogram one bar earlier
    pub macd_hist_prev: f64,
    /// Close of the newest bar
    pub close_latest: f64,
}

impl IndicatorSnapshot {
    /// Name of the first field holding NaN or infinity, if any.
    pub fn first_non_finite(&self) -> Option<&'static str> {
        [
            ("ema_fast", self.ema_fast),
            ("ema_slow", self.ema_slow),
            ("rsi", self.rsi_latest),
            ("ichimoku_a", self.ichimoku_a),
            ("ichimoku_b", self.ichimoku_b),
            ("obv", self.obv_delta),
            ("macd_hist_latest", self.macd_hist_latest),
            ("macd_hist_prev", self.macd_hist_prev),
            ("close", self.close_latest),
        ]
        .into_iter()
        .find(|(_, value)| !value.is_finite())
        .map(|(name, _)| name)
    }
}
