//! Error types for the signal scanner.
//!
//! Everything below [`StartupError`] is recoverable at per-symbol or
//! per-subscriber granularity: the scanner logs it and moves on.

use std::time::Duration;
use thiserror::Error;

use crate::types::{Subscriber, Symbol};

/// Market data errors raised by a [`MarketDataSource`](crate::traits::MarketDataSource).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DataError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Request timed out after {millis} ms")]
    Timeout { millis: u64 },

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Symbol not found: {0}")]
    SymbolNotFound(String),

    #[error("No data available")]
    NoDataAvailable,

    #[error("Insufficient data: need {required} bars, have {available}")]
    InsufficientData { required: usize, available: usize },

    #[error("Bars out of order at index {index}: timestamp {timestamp} does not follow {previous}")]
    Unordered {
        index: usize,
        previous: i64,
        timestamp: i64,
    },
}

impl DataError {
    pub fn timeout(after: Duration) -> Self {
        DataError::Timeout {
            millis: u64::try_from(after.as_millis()).unwrap_or(u64::MAX),
        }
    }
}

/// Indicator calculation errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum IndicatorError {
    #[error("Insufficient data: need {required} points, have {available}")]
    InsufficientData { required: usize, available: usize },

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("{indicator} produced a non-finite value")]
    NonFinite { indicator: &'static str },
}

/// Failure to turn one symbol into an indicator snapshot.
///
/// Either variant means "no signal for this symbol this cycle".
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PipelineError {
    #[error("Data unavailable for {symbol}: {cause}")]
    DataUnavailable { symbol: Symbol, cause: DataError },

    #[error("Indicator computation failed for {symbol}: {source}")]
    IndicatorComputation {
        symbol: Symbol,
        #[source]
        source: IndicatorError,
    },
}

impl PipelineError {
    /// The symbol that failed.
    pub fn symbol(&self) -> &Symbol {
        match self {
            PipelineError::DataUnavailable { symbol, .. } => symbol,
            PipelineError::IndicatorComputation { symbol, .. } => symbol,
        }
    }
}

/// Errors raised by a [`Notifier`](crate::traits::Notifier) transport.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum NotifyError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Rate limited: retry after {retry_after_secs} seconds")]
    RateLimited { retry_after_secs: u64 },

    #[error("Recipient blocked delivery: {0}")]
    Blocked(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },
}

/// A single undelivered message inside a fan-out.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("Delivery to {subscriber} failed: {cause}")]
pub struct DeliveryFailure {
    pub subscriber: Subscriber,
    pub cause: NotifyError,
}

/// Errors that prevent the scanner from ever entering the running state.
#[derive(Error, Debug)]
pub enum StartupError {
    #[error("Missing credential: environment variable {0} is not set")]
    MissingCredential(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Symbol universe is empty")]
    EmptyUniverse,

    #[error("No subscribers configured")]
    NoSubscribers,

    #[error("Symbol discovery failed: {0}")]
    Discovery(#[from] DataError),

    #[error("Notifier setup failed: {0}")]
    Notifier(#[from] NotifyError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pipeline_error_symbol() {
        let err = PipelineError::DataUnavailable {
            symbol: Symbol::from("BTCUSDT"),
            cause: DataError::InsufficientData {
                required: 200,
                available: 150,
            },
        };
        assert_eq!(err.symbol().as_str(), "BTCUSDT");
        assert_eq!(
            err.to_string(),
            "Data unavailable for BTCUSDT: Insufficient data: need 200 bars, have 150"
        );
    }

    #[test]
    fn test_delivery_failure_display() {
        let failure = DeliveryFailure {
            subscriber: Subscriber::from("6068927923"),
            cause: NotifyError::RateLimited {
                retry_after_secs: 5,
            },
        };
        assert_eq!(
            failure.to_string(),
            "Delivery to 6068927923 failed: Rate limited: retry after 5 seconds"
        );
    }

    #[test]
    fn test_timeout_keeps_sub_second_precision() {
        let err = DataError::timeout(Duration::from_millis(250));
        assert_eq!(err, DataError::Timeout { millis: 250 });
        assert_eq!(err.to_string(), "Request timed out after 250 ms");
        assert_eq!(DataError::timeout(Duration::from_secs(2)), DataError::Timeout { millis: 2000 });
    }
}
