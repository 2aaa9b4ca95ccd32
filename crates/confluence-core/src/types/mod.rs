//! Core data types for the signal scanner.

mod ohlcv;
mod signal;
mod snapshot;
mod symbol;
mod timeframe;

pub use ohlcv::{Bar, CandleSeries};
pub use signal::{Direction, Signal};
pub use snapshot::IndicatorSnapshot;
pub use symbol::{Subscriber, SubscriberSet, Symbol};
pub use timeframe::Timeframe;
