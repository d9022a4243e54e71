//! User-facing notifications emitted by cart operations.

use serde::Serialize;
use std::fmt;
use tokio::sync::broadcast;
use tracing::trace;

use crate::ids::ProductId;

/// An advisory message for the presentation layer.
///
/// Notifications are fire-and-forget: they are not part of the cart's data
/// and a notification nobody listens to is simply dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "product_id", rename_all = "snake_case")]
pub enum Notification {
    /// Requested amount is not available.
    OutOfStock(ProductId),
    /// Removal of a product that is not in the cart.
    NotFound(ProductId),
    /// Adding a product failed unexpectedly.
    AddFailed(ProductId),
    /// Changing an amount failed unexpectedly.
    UpdateFailed(ProductId),
    /// The cart could not be saved.
    PersistFailed,
}

impl Notification {
    /// Message suitable for showing to a shopper.
    pub fn message(&self) -> &'static str {
        match self {
            Self::OutOfStock(_) => "Requested quantity is out of stock",
            Self::NotFound(_) => "Failed to remove product",
            Self::AddFailed(_) => "Failed to add product",
            Self::UpdateFailed(_) => "Failed to update product amount",
            Self::PersistFailed => "Failed to save cart",
        }
    }

    /// Product the notification is about, if any.
    pub fn product_id(&self) -> Option<ProductId> {
        match self {
            Self::OutOfStock(id)
            | Self::NotFound(id)
            | Self::AddFailed(id)
            | Self::UpdateFailed(id) => Some(*id),
            Self::PersistFailed => None,
        }
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Sending half of the notification channel.
#[derive(Debug, Clone)]
pub(crate) struct Notifier {
    sender: broadcast::Sender<Notification>,
}

impl Notifier {
    pub(crate) fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub(crate) fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.sender.subscribe()
    }

    pub(crate) fn notify(&self, notification: Notification) {
        if self.sender.send(notification).is_err() {
            trace!(%notification, "No notification listeners");
        }
    }
}
