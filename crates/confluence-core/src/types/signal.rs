//! Evaluator output.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Side of a directional call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
}

impl Direction {
    /// Trade action shown to subscribers.
    pub fn action(&self) -> &'static str {
        match self {
            Direction::Up => "BUY",
            Direction::Down => "SELL",
        }
    }
}

/// Tri-state result of evaluating one symbol in one cycle.
///
/// `None` is the expected, dominant outcome and is not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Signal {
    Up,
    Down,
    #[default]
    None,
}

impl Signal {
    /// Direction of the call, or `None` when there is nothing to report.
    pub fn direction(&self) -> Option<Direction> {
        match self {
            Signal::Up => Some(Direction::Up),
            Signal::Down => Some(Direction::Down),
            Signal::None => None,
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Signal::Up => "up",
            Signal::Down => "down",
            Signal::None => "none",
        };
        f.write_str(s)
    }
}
