//! Builds an [`IndicatorSnapshot`] from a candle series.

use confluence_core::error::IndicatorError;
use confluence_core::traits::{Indicator, MultiOutputIndicator, SeriesIndicator};
use confluence_core::types::{CandleSeries, IndicatorSnapshot};
use serde::{Deserialize, Serialize};

use crate::{Ema, Ichimoku, Macd, Obv, Rsi};

/// Indicator periods feeding the snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotParams {
    pub ema_fast: usize,
    pub ema_slow: usize,
    pub rsi: usize,
    pub macd_fast: usize,
    pub macd_slow: usize,
    pub macd_signal: usize,
    pub ichimoku_conversion: usize,
    pub ichimoku_base: usize,
    pub ichimoku_span_b: usize,
}

impl Default for SnapshotParams {
    fn default() -> Self {
        Self {
            ema_fast: 50,
            ema_slow: 200,
            rsi: 14,
            macd_fast: 12,
            macd_slow: 26,
            macd_signal: 9,
            ichimoku_conversion: 9,
            ichimoku_base: 26,
            ichimoku_span_b: 52,
        }
    }
}

impl SnapshotParams {
    pub fn validate(&self) -> Result<(), IndicatorError> {
        let periods = [
            ("ema_fast", self.ema_fast),
            ("ema_slow", self.ema_slow),
            ("rsi", self.rsi),
            ("macd_fast", self.macd_fast),
            ("macd_slow", self.macd_slow),
            ("macd_signal", self.macd_signal),
            ("ichimoku_conversion", self.ichimoku_conversion),
            ("ichimoku_base", self.ichimoku_base),
            ("ichimoku_span_b", self.ichimoku_span_b),
        ];
        if let Some((name, _)) = periods.iter().find(|(_, p)| *p == 0) {
            return Err(IndicatorError::InvalidParameter(format!(
                "{} period must be greater than 0",
                name
            )));
        }
        if self.ema_fast >= self.ema_slow {
            return Err(IndicatorError::InvalidParameter(
                "Fast EMA period must be less than slow EMA period".into(),
            ));
        }
        if self.macd_fast >= self.macd_slow {
            return Err(IndicatorError::InvalidParameter(
                "Fast MACD period must be less than slow MACD period".into(),
            ));
        }
        Ok(())
    }

    /// Bars needed for every field of the snapshot to be defined.
    ///
    /// With the default periods this is the slow EMA's 200.
    pub fn required_bars(&self) -> usize {
        [
            self.ema_slow,
            self.ema_fast,
            self.rsi + 1,
            // two histogram points
            self.macd_slow + self.macd_signal,
            self.ichimoku_conversion,
            self.ichimoku_base,
            self.ichimoku_span_b,
            // two bars for an OBV difference
            2,
        ]
        .into_iter()
        .max()
        .unwrap_or(2)
    }
}

/// Runs every indicator over a series and keeps the newest readings.
#[derive(Debug, Clone)]
pub struct SnapshotBuilder {
    params: SnapshotParams,
    ema_fast: Ema,
    ema_slow: Ema,
    rsi: Rsi,
    macd: Macd,
    ichimoku: Ichimoku,
    obv: Obv,
}

impl SnapshotBuilder {
    pub fn new(params: SnapshotParams) -> Result<Self, IndicatorError> {
        params.validate()?;
        Ok(Self {
            params,
            ema_fast: Ema::new(params.ema_fast),
            ema_slow: Ema::new(params.ema_slow),
            rsi: Rsi::new(params.rsi),
            macd: Macd::with_periods(params.macd_fast, params.macd_slow, params.macd_signal),
            ichimoku: Ichimoku::with_periods(
                params.ichimoku_conversion,
                params.ichimoku_base,
                params.ichimoku_span_b,
            ),
            obv: Obv::new(),
        })
    }

    pub fn required_bars(&self) -> usize {
        self.params.required_bars()
    }

    /// Compute the snapshot for the newest bar of `series`.
    ///
    /// Fails on a series shorter than [`required_bars`](Self::required_bars)
    /// and on any non-finite input or output value.
    pub fn compute(&self, series: &CandleSeries) -> Result<IndicatorSnapshot, IndicatorError> {
        let required = self.required_bars();
        if series.len() < required {
            return Err(IndicatorError::InsufficientData {
                required,
                available: series.len(),
            });
        }

        let finite_input = series.bars().iter().all(|b| {
            b.high.is_finite() && b.low.is_finite() && b.close.is_finite() && b.volume.is_finite()
        });
        if !finite_input {
            return Err(IndicatorError::NonFinite {
                indicator: "candles",
            });
        }

        let closes = series.closes();
        let insufficient = || IndicatorError::InsufficientData {
            required,
            available: series.len(),
        };

        let ema_fast = latest(&self.ema_fast.calculate(&closes)).ok_or_else(insufficient)?;
        let ema_slow = latest(&self.ema_slow.calculate(&closes)).ok_or_else(insufficient)?;
        let rsi_latest = latest(&self.rsi.calculate(&closes)).ok_or_else(insufficient)?;

        let hist: Vec<f64> = self
            .macd
            .calculate(&closes)
            .iter()
            .map(|o| o.histogram)
            .collect();
        let (macd_hist_prev, macd_hist_latest) = latest_pair(&hist).ok_or_else(insufficient)?;

        let cloud = latest(&self.ichimoku.calculate(series)).ok_or_else(insufficient)?;

        let obv = self.obv.calculate(series);
        let (obv_prev, obv_latest) = latest_pair(&obv).ok_or_else(insufficient)?;

        let snapshot = IndicatorSnapshot {
            ema_fast,
            ema_slow,
            rsi_latest,
            ichimoku_a: cloud.span_a,
            ichimoku_b: cloud.span_b,
            obv_delta: obv_latest - obv_prev,
            macd_hist_latest,
            macd_hist_prev,
            close_latest: closes[closes.len() - 1],
        };

        match snapshot.first_non_finite() {
            Some(indicator) => Err(IndicatorError::NonFinite { indicator }),
            None => Ok(snapshot),
        }
    }
}

impl Default for SnapshotBuilder {
    fn default() -> Self {
        let params = SnapshotParams::default();
        Self {
            params,
            ema_fast: Ema::new(params.ema_fast),
            ema_slow: Ema::new(params.ema_slow),
            rsi: Rsi::new(params.rsi),
            macd: Macd::new(),
            ichimoku: Ichimoku::new(),
            obv: Obv::new(),
        }
    }
}

fn latest<T: Copy>(values: &[T]) -> Option<T> {
    values.last().copied()
}

fn latest_pair(values: &[f64]) -> Option<(f64, f64)> {
    match values {
        [.., prev, latest] => Some((*prev, *latest)),
        _ => None,
    }
}
