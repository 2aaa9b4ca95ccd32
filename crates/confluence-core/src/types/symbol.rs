//! Instrument and recipient identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque identifier of a tradable instrument, e.g. `BTCUSDT`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Symbol(String);

impl Symbol {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Symbol {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for Symbol {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl AsRef<str> for Symbol {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A notification recipient (chat or channel handle).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Subscriber(String);

impl Subscriber {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Subscriber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Subscriber {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for Subscriber {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Ordered, duplicate-free set of recipients.
///
/// Iteration order is the configured order; it is also the delivery order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubscriberSet {
    subscribers: Vec<Subscriber>,
}

impl SubscriberSet {
    pub fn new(subscribers: impl IntoIterator<Item = Subscriber>) -> Self {
        let mut unique: Vec<Subscriber> = Vec::new();
        for subscriber in subscribers {
            if !unique.contains(&subscriber) {
                unique.push(subscriber);
            }
        }
        Self { subscribers: unique }
    }

    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Subscriber> {
        self.subscribers.iter()
    }
}

impl FromIterator<Subscriber> for SubscriberSet {
    fn from_iter<T: IntoIterator<Item = Subscriber>>(iter: T) -> Self {
        Self::new(iter)
    }
}
