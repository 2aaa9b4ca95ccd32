//! Messaging transport trait.

use async_trait::async_trait;

use crate::error::NotifyError;
use crate::types::Subscriber;

/// Delivers a text message to one recipient.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Send `text` to `subscriber`. `Ok` is the transport acknowledgement.
    async fn send_notification(&self, subscriber: &Subscriber, text: &str)
        -> Result<(), NotifyError>;

    /// Get the transport name.
    fn name(&self) -> &str;
}
