//! Cart store configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use turbo_cache::cache_key;

/// Configuration for a [`CartStore`](crate::CartStore).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Storage key the cart blob lives under.
    #[serde(default = "default_storage_key")]
    pub storage_key: String,

    /// Upper bound for each stock or catalog call, in milliseconds.
    /// No bound when unset.
    #[serde(default)]
    pub service_timeout_ms: Option<u64>,

    /// Buffered notifications per slow listener before the oldest are dropped.
    #[serde(default = "default_notification_capacity")]
    pub notification_capacity: usize,
}

fn default_storage_key() -> String {
    cache_key!("@RocketShoes", "cart")
}

fn default_notification_capacity() -> usize {
    32
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            storage_key: default_storage_key(),
            service_timeout_ms: None,
            notification_capacity: default_notification_capacity(),
        }
    }
}

impl StoreConfig {
    /// Use a different storage key.
    pub fn with_storage_key(mut self, key: impl Into<String>) -> Self {
        self.storage_key = key.into();
        self
    }

    /// Bound every service call.
    pub fn with_service_timeout(mut self, timeout: Duration) -> Self {
        self.service_timeout_ms = Some(timeout.as_millis() as u64);
        self
    }

    /// Service call bound as a duration.
    pub fn service_timeout(&self) -> Option<Duration> {
        self.service_timeout_ms.map(Duration::from_millis)
    }
}
