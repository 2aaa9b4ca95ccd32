//! Logging setup.

mod logging;

pub use logging::{setup_logging, LogFormat};
pub use tracing_appender::non_blocking::WorkerGuard;
