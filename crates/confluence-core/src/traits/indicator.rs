//! Indicator trait definitions.

use crate::types::CandleSeries;

/// Trait for technical indicators over a single input series.
///
/// Indicators process price data and produce derived values
/// useful for trading decisions.
pub trait Indicator: Send + Sync {
    /// The output type of the indicator.
    type Output;

    /// Calculate indicator values for the given data.
    ///
    /// # Arguments
    /// * `data` - Input data (typically close prices), oldest first
    ///
    /// # Returns
    /// A vector of indicator values, oldest first. Empty when `data` is
    /// shorter than [`period`](Indicator::period).
    fn calculate(&self, data: &[f64]) -> Vec<Self::Output>;

    /// Get the minimum data points required.
    fn period(&self) -> usize;

    /// Get the name of the indicator.
    fn name(&self) -> &'static str;
}

/// Multi-output indicator (e.g., MACD).
///
/// Some indicators produce multiple related values.
pub trait MultiOutputIndicator: Send + Sync {
    /// The output type containing multiple values.
    type Outputs;

    /// Calculate indicator values for the given data.
    fn calculate(&self, data: &[f64]) -> Vec<Self::Outputs>;

    /// Get the minimum data points required.
    fn period(&self) -> usize;

    /// Get the name of the indicator.
    fn name(&self) -> &'static str;
}

/// Indicator that needs more of each bar than the close (high/low, volume).
pub trait SeriesIndicator: Send + Sync {
    /// The output type of the indicator.
    type Output;

    /// Calculate indicator values from a candle series, oldest first.
    fn calculate(&self, series: &CandleSeries) -> Vec<Self::Output>;

    /// Get the minimum bars required.
    fn period(&self) -> usize;

    /// Get the name of the indicator.
    fn name(&self) -> &'static str;
}
