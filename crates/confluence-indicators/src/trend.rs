//! Trend indicators built from high/low extremes.

use confluence_core::traits::SeriesIndicator;
use confluence_core::types::CandleSeries;
use serde::{Deserialize, Serialize};

/// Ichimoku lines at one bar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IchimokuOutput {
    /// Tenkan-sen: midpoint of the conversion window
    pub conversion: f64,
    /// Kijun-sen: midpoint of the base window
    pub base: f64,
    /// Leading span A: average of conversion and base
    pub span_a: f64,
    /// Leading span B: midpoint of the span-B window
    pub span_b: f64,
}

/// Ichimoku cloud.
///
/// Spans are reported at the bar they are computed from, without the
/// forward displacement used when charting the cloud.
#[derive(Debug, Clone)]
pub struct Ichimoku {
    conversion_period: usize,
    base_period: usize,
    span_b_period: usize,
}

impl Ichimoku {
    /// Create an Ichimoku indicator with default periods (9, 26, 52).
    pub fn new() -> Self {
        Self::with_periods(9, 26, 52)
    }

    pub fn with_periods(conversion: usize, base: usize, span_b: usize) -> Self {
        assert!(conversion > 0 && base > 0 && span_b > 0);
        Self {
            conversion_period: conversion,
            base_period: base,
            span_b_period: span_b,
        }
    }

    /// Midpoint of the highest high and lowest low over `period` bars ending at `end`.
    fn midpoint(high: &[f64], low: &[f64], end: usize, period: usize) -> f64 {
        let start = end + 1 - period;
        let highest = high[start..=end]
            .iter()
            .cloned()
            .fold(f64::NEG_INFINITY, f64::max);
        let lowest = low[start..=end]
            .iter()
            .cloned()
            .fold(f64::INFINITY, f64::min);
        (highest + lowest) / 2.0
    }
}

impl Default for Ichimoku {
    fn default() -> Self {
        Self::new()
    }
}

impl SeriesIndicator for Ichimoku {
    type Output = IchimokuOutput;

    fn calculate(&self, series: &CandleSeries) -> Vec<IchimokuOutput> {
        let period = self.period();
        if series.len() < period {
            return vec![];
        }

        let high = series.highs();
        let low = series.lows();

        ((period - 1)..series.len())
            .map(|i| {
                let conversion = Self::midpoint(&high, &low, i, self.conversion_period);
                let base = Self::midpoint(&high, &low, i, self.base_period);
                IchimokuOutput {
                    conversion,
                    base,
                    span_a: (conversion + base) / 2.0,
                    span_b: Self::midpoint(&high, &low, i, self.span_b_period),
                }
            })
            .collect()
    }

    fn period(&self) -> usize {
        self.conversion_period
            .max(self.base_period)
            .max(self.span_b_period)
    }

    fn name(&self) -> &'static str {
        "Ichimoku"
    }
}
