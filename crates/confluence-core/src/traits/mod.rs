//! Core traits for the signal scanner.

mod indicator;
mod market_data;
mod notifier;

pub use indicator::{Indicator, MultiOutputIndicator, SeriesIndicator};
pub use market_data::MarketDataSource;
pub use notifier::Notifier;
