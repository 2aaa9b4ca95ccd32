//! Confluence strategy.
//!
//! A directional signal fires only when trend, momentum, the Ichimoku cloud,
//! volume flow and a fresh MACD histogram crossing all agree.

mod confluence;

pub use confluence::{conditions, evaluate, ConditionSet};
