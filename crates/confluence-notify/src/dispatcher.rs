//! Fan-out of signals to subscribers.

use confluence_core::error::DeliveryFailure;
use confluence_core::traits::Notifier;
use confluence_core::types::{Direction, Signal, SubscriberSet, Symbol};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Message text for a signal, or `None` when there is nothing to send.
pub fn format_signal_message(symbol: &Symbol, signal: Signal) -> Option<String> {
    signal
        .direction()
        .map(|direction| message_for(symbol, direction))
}

fn message_for(symbol: &Symbol, direction: Direction) -> String {
    format!("Found {} signal for {}", direction.action(), symbol)
}

/// Result of one fan-out.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DispatchReport {
    pub attempted: usize,
    pub delivered: usize,
    pub failures: Vec<DeliveryFailure>,
}

impl DispatchReport {
    pub fn all_delivered(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Sends signal messages to a fixed subscriber set.
///
/// Delivery is sequential in subscriber order. A failed send is recorded and
/// logged; it never prevents delivery to the remaining subscribers.
pub struct Dispatcher {
    notifier: Arc<dyn Notifier>,
    subscribers: SubscriberSet,
}

impl Dispatcher {
    pub fn new(notifier: Arc<dyn Notifier>, subscribers: SubscriberSet) -> Self {
        Self {
            notifier,
            subscribers,
        }
    }

    pub fn subscribers(&self) -> &SubscriberSet {
        &self.subscribers
    }

    pub fn notifier_name(&self) -> &str {
        self.notifier.name()
    }

    pub async fn dispatch(&self, symbol: &Symbol, signal: Signal) -> DispatchReport {
        let Some(text) = format_signal_message(symbol, signal) else {
            return DispatchReport::default();
        };

        let mut report = DispatchReport::default();
        for subscriber in self.subscribers.iter() {
            report.attempted += 1;
            match self.notifier.send_notification(subscriber, &text).await {
                Ok(()) => {
                    debug!(symbol = %symbol, subscriber = %subscriber, "Signal delivered");
                    report.delivered += 1;
                }
                Err(cause) => {
                    let failure = DeliveryFailure {
                        subscriber: subscriber.clone(),
                        cause,
                    };
                    warn!(symbol = %symbol, error = %failure, "Signal delivery failed");
                    report.failures.push(failure);
                }
            }
        }

        info!(
            symbol = %symbol,
            signal = %signal,
            delivered = report.delivered,
            failed = report.failures.len(),
            "Signal dispatched"
        );
        report
    }
}
