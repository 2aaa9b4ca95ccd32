//! Notifier that logs instead of sending.

use async_trait::async_trait;
use confluence_core::error::NotifyError;
use confluence_core::traits::Notifier;
use confluence_core::types::Subscriber;
use std::sync::Mutex;
use tracing::info;

/// Logs each message and keeps a copy in memory.
#[derive(Debug, Default)]
pub struct DryRunNotifier {
    sent: Mutex<Vec<(Subscriber, String)>>,
}

impl DryRunNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages "sent" so far, oldest first.
    pub fn sent(&self) -> Vec<(Subscriber, String)> {
        self.sent
            .lock()
            .map(|sent| sent.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl Notifier for DryRunNotifier {
    async fn send_notification(&self, subscriber: &Subscriber, text: &str) -> Result<(), NotifyError> {
        info!(subscriber = %subscriber, text, "Dry-run notification");
        if let Ok(mut sent) = self.sent.lock() {
            sent.push((subscriber.clone(), text.to_string()));
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "dry-run"
    }
}
