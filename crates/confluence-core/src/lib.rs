//! Core types and traits for the signal scanner.
//!
//! This crate provides the foundational building blocks including:
//! - Market data types (Bar, CandleSeries, Timeframe)
//! - The per-cycle indicator snapshot and the tri-state signal
//! - Subscriber identifiers
//! - The error taxonomy shared by every stage of a scan
//! - Collaborator traits for market data, notifications and indicators

pub mod error;
pub mod traits;
pub mod types;

pub use error::{
    DataError, DeliveryFailure, IndicatorError, NotifyError, PipelineError, StartupError,
};
pub use traits::*;
pub use types::*;
