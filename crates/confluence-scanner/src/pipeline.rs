//! Candles in, indicator snapshot out.

use confluence_core::error::{DataError, IndicatorError, PipelineError};
use confluence_core::traits::MarketDataSource;
use confluence_core::types::{IndicatorSnapshot, Symbol, Timeframe};
use confluence_indicators::{SnapshotBuilder, SnapshotParams};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Fetch parameters for the pipeline.
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub timeframe: Timeframe,
    /// Bars requested per fetch.
    pub limit: usize,
    /// Upper bound on a single fetch, on top of any transport timeout.
    pub fetch_timeout: Duration,
    pub params: SnapshotParams,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            timeframe: Timeframe::Hour1,
            limit: 1000,
            fetch_timeout: Duration::from_secs(30),
            params: SnapshotParams::default(),
        }
    }
}

/// Fetches a symbol's candles and reduces them to an [`IndicatorSnapshot`].
pub struct IndicatorPipeline {
    source: Arc<dyn MarketDataSource>,
    settings: PipelineSettings,
    builder: SnapshotBuilder,
}

impl IndicatorPipeline {
    pub fn new(source: Arc<dyn MarketDataSource>, settings: PipelineSettings) -> Result<Self, IndicatorError> {
        let builder = SnapshotBuilder::new(settings.params)?;
        if settings.limit < builder.required_bars() {
            return Err(IndicatorError::InvalidParameter(format!(
                "fetch limit {} is below the {} bars the indicators need",
                settings.limit,
                builder.required_bars()
            )));
        }
        Ok(Self {
            source,
            settings,
            builder,
        })
    }

    pub fn source_name(&self) -> &str {
        self.source.name()
    }

    pub fn required_bars(&self) -> usize {
        self.builder.required_bars()
    }

    pub async fn snapshot(&self, symbol: &Symbol) -> Result<IndicatorSnapshot, PipelineError> {
        let unavailable = |cause: DataError| PipelineError::DataUnavailable {
            symbol: symbol.clone(),
            cause,
        };

        let fetch = self
            .source
            .fetch_candles(symbol, self.settings.timeframe, self.settings.limit);
        let series = tokio::time::timeout(self.settings.fetch_timeout, fetch)
            .await
            .map_err(|_| unavailable(DataError::timeout(self.settings.fetch_timeout)))?
            .map_err(unavailable)?;

        let required = self.required_bars();
        if series.len() < required {
            return Err(unavailable(DataError::InsufficientData {
                required,
                available: series.len(),
            }));
        }
        debug!(symbol = %symbol, bars = series.len(), "Candles fetched");

        self.builder
            .compute(&series)
            .map_err(|source| PipelineError::IndicatorComputation {
                symbol: symbol.clone(),
                source,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{bars_from_closes, breakout, short, FakeSource};

    fn pipeline(source: FakeSource) -> IndicatorPipeline {
        IndicatorPipeline::new(Arc::new(source), PipelineSettings::default()).unwrap()
    }

    #[test]
    fn test_limit_below_lookback_rejected() {
        let settings = PipelineSettings {
            limit: 150,
            ..Default::default()
        };
        assert!(matches!(
            IndicatorPipeline::new(Arc::new(FakeSource::new()), settings),
            Err(IndicatorError::InvalidParameter(_))
        ));
    }

    #[tokio::test]
    async fn test_snapshot_from_breakout() {
        let pipeline = pipeline(FakeSource::new().with("BTCUSDT", breakout()));
        let snapshot = pipeline.snapshot(&"BTCUSDT".into()).await.unwrap();

        assert!((snapshot.close_latest - 253.5).abs() < 1e-10);
        assert!(snapshot.macd_hist_prev < 0.0 && snapshot.macd_hist_latest > 0.0);
    }

    #[tokio::test]
    async fn test_short_history_is_data_unavailable() {
        let pipeline = pipeline(FakeSource::new().with("NEWUSDT", short(150)));
        let err = pipeline.snapshot(&"NEWUSDT".into()).await.unwrap_err();

        assert_eq!(
            err,
            PipelineError::DataUnavailable {
                symbol: "NEWUSDT".into(),
                cause: DataError::InsufficientData {
                    required: 200,
                    available: 150
                }
            }
        );
    }

    #[tokio::test]
    async fn test_fetch_error_is_data_unavailable() {
        let pipeline = pipeline(FakeSource::new());
        let err = pipeline.snapshot(&"GONEUSDT".into()).await.unwrap_err();

        assert!(matches!(
            err,
            PipelineError::DataUnavailable {
                cause: DataError::SymbolNotFound(_),
                ..
            }
        ));
        assert_eq!(err.symbol().as_str(), "GONEUSDT");
    }

    #[tokio::test]
    async fn test_flat_series_is_computation_error() {
        let pipeline = pipeline(FakeSource::new().with("FLATUSDT", bars_from_closes(&[5.0; 300])));
        let err = pipeline.snapshot(&"FLATUSDT".into()).await.unwrap_err();

        assert_eq!(
            err,
            PipelineError::IndicatorComputation {
                symbol: "FLATUSDT".into(),
                source: IndicatorError::NonFinite { indicator: "rsi" }
            }
        );
    }

    #[tokio::test]
    async fn test_slow_fetch_times_out() {
        let source = FakeSource::new()
            .with("BTCUSDT", breakout())
            .with_delay(Duration::from_secs(10));
        let settings = PipelineSettings {
            fetch_timeout: Duration::from_secs(1),
            ..Default::default()
        };
        let pipeline = IndicatorPipeline::new(Arc::new(source), settings).unwrap();

        let err = pipeline.snapshot(&"BTCUSDT".into()).await.unwrap_err();
        assert_eq!(
            err,
            PipelineError::DataUnavailable {
                symbol: "BTCUSDT".into(),
                cause: DataError::Timeout { millis: 1000 }
            }
        );
    }

    #[tokio::test]
    async fn test_sub_second_timeout_is_reported_in_millis() {
        let source = FakeSource::new()
            .with("BTCUSDT", breakout())
            .with_delay(Duration::from_secs(10));
        let settings = PipelineSettings {
            fetch_timeout: Duration::from_millis(200),
            ..Default::default()
        };
        let pipeline = IndicatorPipeline::new(Arc::new(source), settings).unwrap();

        let err = pipeline.snapshot(&"BTCUSDT".into()).await.unwrap_err();
        assert!(matches!(
            err,
            PipelineError::DataUnavailable {
                cause: DataError::Timeout { millis: 200 },
                ..
            }
        ));
        assert!(err.to_string().ends_with("Request timed out after 200 ms"));
    }
}
