//! Signal scanner.
//!
//! Walks a fixed symbol universe in order. For each symbol it builds an
//! indicator snapshot, evaluates the confluence rule and notifies every
//! subscriber of a directional signal. Passes repeat after a delay until a
//! stop is requested.

mod pipeline;
mod scheduler;
mod universe;

#[cfg(test)]
mod testing;

pub use pipeline::{IndicatorPipeline, PipelineSettings};
pub use scheduler::{CycleReport, ScanControl, ScanSummary, Scanner, ScannerSettings, ScannerStatus};
pub use universe::{discover_universe, UniverseSettings};
