//! Signal notifications.
//!
//! [`Dispatcher`] fans a directional signal out to every subscriber through a
//! [`Notifier`](confluence_core::traits::Notifier) transport.

mod dispatcher;
mod dry_run;
mod telegram;

pub use dispatcher::{format_signal_message, DispatchReport, Dispatcher};
pub use dry_run::DryRunNotifier;
pub use telegram::{TelegramConfig, TelegramNotifier};
