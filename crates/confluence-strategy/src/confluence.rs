//! Confluence rule over an [`IndicatorSnapshot`].
//!
//! Every comparison is strict: a reading sitting exactly on its threshold
//! (RSI at 50, a histogram at 0, close on the cloud edge) does not count.
//! NaN fails every comparison, so a malformed snapshot can only yield
//! [`Signal::None`].

use confluence_core::types::{Direction, IndicatorSnapshot, Signal};
use serde::{Deserialize, Serialize};

const RSI_MIDLINE: f64 = 50.0;

/// Outcome of each of the five conditions for one direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConditionSet {
    pub direction: Direction,
    /// Fast EMA on the right side of the slow EMA
    pub trend: bool,
    /// RSI on the right side of 50
    pub momentum: bool,
    /// Close outside the cloud on the right side
    pub cloud: bool,
    /// OBV moved in the direction over the newest bar
    pub volume: bool,
    /// MACD histogram crossed zero in the direction on the newest bar
    pub macd_cross: bool,
}

impl ConditionSet {
    pub fn all(&self) -> bool {
        self.trend && self.momentum && self.cloud && self.volume && self.macd_cross
    }

    /// Number of conditions met, for diagnostics.
    pub fn met(&self) -> usize {
        [self.trend, self.momentum, self.cloud, self.volume, self.macd_cross]
            .iter()
            .filter(|&&c| c)
            .count()
    }
}

/// Check the five conditions for `direction`.
pub fn conditions(snapshot: &IndicatorSnapshot, direction: Direction) -> ConditionSet {
    let s = snapshot;
    match direction {
        Direction::Up => ConditionSet {
            direction,
            trend: s.ema_fast > s.ema_slow,
            momentum: s.rsi_latest > RSI_MIDLINE,
            cloud: s.close_latest > s.ichimoku_a && s.close_latest > s.ichimoku_b,
            volume: s.obv_delta > 0.0,
            macd_cross: s.macd_hist_latest > 0.0 && s.macd_hist_prev < 0.0,
        },
        Direction::Down => ConditionSet {
            direction,
            trend: s.ema_fast < s.ema_slow,
            momentum: s.rsi_latest < RSI_MIDLINE,
            cloud: s.close_latest < s.ichimoku_a && s.close_latest < s.ichimoku_b,
            volume: s.obv_delta < 0.0,
            macd_cross: s.macd_hist_latest < 0.0 && s.macd_hist_prev > 0.0,
        },
    }
}

/// Map a snapshot to a signal. Pure and deterministic.
pub fn evaluate(snapshot: &IndicatorSnapshot) -> Signal {
    if conditions(snapshot, Direction::Up).all() {
        Signal::Up
    } else if conditions(snapshot, Direction::Down).all() {
        Signal::Down
    } else {
        Signal::None
    }
}
