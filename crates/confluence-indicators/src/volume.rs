//! Volume indicators.

use confluence_core::traits::SeriesIndicator;
use confluence_core::types::CandleSeries;

/// On-Balance Volume (OBV).
///
/// Running total starting at zero on the first bar: a higher close adds the
/// bar's volume, a lower close subtracts it, an unchanged close adds nothing.
#[derive(Debug, Clone, Default)]
pub struct Obv;

impl Obv {
    pub fn new() -> Self {
        Self
    }
}

impl SeriesIndicator for Obv {
    type Output = f64;

    fn calculate(&self, series: &CandleSeries) -> Vec<f64> {
        let bars = series.bars();
        let Some(first) = bars.first() else {
            return vec![];
        };

        let mut obv = 0.0;
        let mut prev_close = first.close;
        let mut result = Vec::with_capacity(bars.len());
        result.push(obv);

        for bar in &bars[1..] {
            if bar.close > prev_close {
                obv += bar.volume;
            } else if bar.close < prev_close {
                obv -= bar.volume;
            }
            prev_close = bar.close;
            result.push(obv);
        }

        result
    }

    fn period(&self) -> usize {
        1
    }

    fn name(&self) -> &'static str {
        "OBV"
    }
}
