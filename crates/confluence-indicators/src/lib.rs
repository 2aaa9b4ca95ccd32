//! Technical indicators.
//!
//! This crate provides the indicators the confluence rule reads:
//! - Exponential moving average
//! - Momentum indicators (RSI, MACD)
//! - Ichimoku cloud lines
//! - On-balance volume
//!
//! [`SnapshotBuilder`] runs all of them over a candle series and keeps only
//! the newest readings.

pub mod momentum;
pub mod moving_average;
pub mod snapshot;
pub mod trend;
pub mod volume;

pub use momentum::{Macd, MacdOutput, Rsi};
pub use moving_average::Ema;
pub use snapshot::{SnapshotBuilder, SnapshotParams};
pub use trend::{Ichimoku, IchimokuOutput};
pub use volume::Obv;
