//! Cart error types.

use thiserror::Error;
use turbo_cache::CacheError;

use crate::ids::ProductId;
use crate::notify::Notification;

/// Errors that can occur when talking to the stock or catalog services.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ServiceError {
    #[error("HTTP error: {status} for {url}")]
    Http { status: u16, url: String },

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),

    /// The service has no record for this product.
    #[error("Unknown product: {0}")]
    UnknownProduct(ProductId),

    #[error("Request error: {0}")]
    Request(String),
}

/// Errors that can occur in cart operations.
///
/// Every variant leaves the cart unchanged.
#[derive(Error, Debug)]
pub enum CartError {
    /// Requested amount exceeds available stock, or stock is exhausted.
    #[error("Out of stock for {product_id}: requested {requested}, available {available}")]
    OutOfStock {
        product_id: ProductId,
        requested: i64,
        available: i64,
    },

    /// Product is not in the cart.
    #[error("Item not in cart: {0}")]
    NotFound(ProductId),

    /// Adding failed because a service call failed.
    #[error("Failed to add product {product_id}: {source}")]
    AddFailed {
        product_id: ProductId,
        #[source]
        source: ServiceError,
    },

    /// Changing the amount failed because a service call failed.
    #[error("Failed to update amount of product {product_id}: {source}")]
    UpdateFailed {
        product_id: ProductId,
        #[source]
        source: ServiceError,
    },

    /// The new cart could not be written to storage.
    #[error("Failed to persist cart: {0}")]
    Persist(#[from] CacheError),
}

impl CartError {
    /// The user-facing notification for this failure.
    pub fn notification(&self) -> Notification {
        match self {
            CartError::OutOfStock { product_id, .. } => Notification::OutOfStock(*product_id),
            CartError::NotFound(id) => Notification::NotFound(*id),
            CartError::AddFailed { product_id, .. } => Notification::AddFailed(*product_id),
            CartError::UpdateFailed { product_id, .. } => Notification::UpdateFailed(*product_id),
            CartError::Persist(_) => Notification::PersistFailed,
        }
    }
}

/// Why a list of line items is not a valid cart.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvalidCart {
    #[error("duplicate line item for product {0}")]
    DuplicateItem(ProductId),

    #[error("line item for product {product_id} has non-positive amount {amount}")]
    NonPositiveAmount { product_id: ProductId, amount: i64 },
}
