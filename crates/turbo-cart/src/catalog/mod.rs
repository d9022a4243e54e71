//! Product catalog and stock services.
//!
//! The cart only reads from these services. [`StockService`] answers "how
//! many of this product are available", [`CatalogService`] answers "what is
//! this product called, what does it cost, what does it look like".

mod inventory;
mod memory;
mod product;

#[cfg(feature = "http")]
mod http;

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::ServiceError;
use crate::ids::ProductId;

pub use inventory::StockRecord;
pub use memory::{Fixtures, InMemoryCatalog, ProductFixture, StockFixture};
pub use product::ProductRecord;

#[cfg(feature = "http")]
pub use http::HttpApi;

/// Read-only access to stock levels.
#[async_trait]
pub trait StockService: Send + Sync {
    /// Available amount for a product.
    async fn stock(&self, id: ProductId) -> Result<StockRecord, ServiceError>;
}

/// Read-only access to product metadata.
#[async_trait]
pub trait CatalogService: Send + Sync {
    /// Metadata for a product.
    async fn product(&self, id: ProductId) -> Result<ProductRecord, ServiceError>;
}

#[async_trait]
impl<T: StockService + ?Sized> StockService for Arc<T> {
    async fn stock(&self, id: ProductId) -> Result<StockRecord, ServiceError> {
        (**self).stock(id).await
    }
}

#[async_trait]
impl<T: CatalogService + ?Sized> CatalogService for Arc<T> {
    async fn product(&self, id: ProductId) -> Result<ProductRecord, ServiceError> {
        (**self).product(id).await
    }
}
