//! In-memory catalog and stock, for tests and offline use.

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{CatalogService, ProductRecord, StockRecord, StockService};
use crate::error::ServiceError;
use crate::ids::ProductId;

/// A product entry in a fixtures file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProductFixture {
    pub id: ProductId,
    pub title: String,
    pub price: f64,
    pub image: String,
}

/// A stock entry in a fixtures file.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct StockFixture {
    pub id: ProductId,
    pub amount: i64,
}

/// Catalog snapshot in the same shape the storefront API serves:
/// a `products` array and a `stock` array.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Fixtures {
    #[serde(default)]
    pub products: Vec<ProductFixture>,
    #[serde(default)]
    pub stock: Vec<StockFixture>,
}

impl Fixtures {
    /// Read fixtures from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ServiceError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| ServiceError::Request(format!("{}: {}", path.display(), e)))?;
        serde_json::from_str(&content)
            .map_err(|e| ServiceError::Deserialization(format!("{}: {}", path.display(), e)))
    }
}

#[derive(Debug, Default)]
struct State {
    products: HashMap<ProductId, ProductRecord>,
    stock: HashMap<ProductId, StockRecord>,
    failure: Option<ServiceError>,
}

/// Stock and catalog service backed by maps.
///
/// Implements both [`StockService`] and [`CatalogService`]. Clones share
/// state, so a test can adjust stock while a store holds another handle.
/// Unknown products yield [`ServiceError::UnknownProduct`].
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    state: Arc<RwLock<State>>,
    latency: Option<Duration>,
}

impl InMemoryCatalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a catalog from fixtures.
    pub fn from_fixtures(fixtures: Fixtures) -> Self {
        let catalog = Self::new();
        {
            let mut state = catalog.write();
            for p in fixtures.products {
                state
                    .products
                    .insert(p.id, ProductRecord::new(p.title, p.price, p.image));
            }
            for s in fixtures.stock {
                state.stock.insert(s.id, StockRecord::new(s.amount));
            }
        }
        catalog
    }

    /// Add a product with metadata and stock.
    pub fn with_product(self, id: ProductId, product: ProductRecord, stock: i64) -> Self {
        {
            let mut state = self.write();
            state.products.insert(id, product);
            state.stock.insert(id, StockRecord::new(stock));
        }
        self
    }

    /// Add stock for a product without catalog metadata.
    pub fn with_stock(self, id: ProductId, amount: i64) -> Self {
        self.set_stock(id, amount);
        self
    }

    /// Delay every call by `latency`, yielding to the runtime.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Change the stock level of a product.
    pub fn set_stock(&self, id: ProductId, amount: i64) {
        self.write().stock.insert(id, StockRecord::new(amount));
    }

    /// Make every call fail with `error` until cleared with `None`.
    pub fn set_failure(&self, error: Option<ServiceError>) {
        self.write().failure = error;
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, State> {
        // Every write is a single insert, so a poisoned lock still holds
        // consistent state.
        self.state.write().unwrap_or_else(|e| e.into_inner())
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, State> {
        self.state.read().unwrap_or_else(|e| e.into_inner())
    }

    async fn delay(&self) {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }
}

#[async_trait]
impl StockService for InMemoryCatalog {
    async fn stock(&self, id: ProductId) -> Result<StockRecord, ServiceError> {
        self.delay().await;
        let state = self.read();
        if let Some(error) = &state.failure {
            return Err(error.clone());
        }
        state
            .stock
            .get(&id)
            .copied()
            .ok_or(ServiceError::UnknownProduct(id))
    }
}

#[async_trait]
impl CatalogService for InMemoryCatalog {
    async fn product(&self, id: ProductId) -> Result<ProductRecord, ServiceError> {
        self.delay().await;
        let state = self.read();
        if let Some(error) = &state.failure {
            return Err(error.clone());
        }
        state
            .products
            .get(&id)
            .cloned()
            .ok_or(ServiceError::UnknownProduct(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sneaker() -> ProductRecord {
        ProductRecord::new("Sneaker", 139.9, "sneaker.jpg")
    }

    #[tokio::test]
    async fn test_lookup() {
        let catalog = InMemoryCatalog::new().with_product(ProductId::new(1), sneaker(), 3);

        assert_eq!(catalog.stock(ProductId::new(1)).await.unwrap().amount, 3);
        assert_eq!(catalog.product(ProductId::new(1)).await.unwrap(), sneaker());
    }

    #[tokio::test]
    async fn test_unknown_product() {
        let catalog = InMemoryCatalog::new().with_stock(ProductId::new(2), 1);

        assert_eq!(
            catalog.stock(ProductId::new(9)).await,
            Err(ServiceError::UnknownProduct(ProductId::new(9)))
        );
        // Stock without metadata
        assert_eq!(
            catalog.product(ProductId::new(2)).await,
            Err(ServiceError::UnknownProduct(ProductId::new(2)))
        );
    }

    #[tokio::test]
    async fn test_clones_share_stock() {
        let catalog = InMemoryCatalog::new().with_product(ProductId::new(1), sneaker(), 3);
        let handle = catalog.clone();
        handle.set_stock(ProductId::new(1), 0);

        assert_eq!(catalog.stock(ProductId::new(1)).await.unwrap().amount, 0);
    }

    #[tokio::test]
    async fn test_injected_failure() {
        let catalog = InMemoryCatalog::new().with_product(ProductId::new(1), sneaker(), 3);
        catalog.set_failure(Some(ServiceError::Connection("refused".into())));
        assert!(catalog.stock(ProductId::new(1)).await.is_err());
        assert!(catalog.product(ProductId::new(1)).await.is_err());

        catalog.set_failure(None);
        assert!(catalog.stock(ProductId::new(1)).await.is_ok());
    }

    #[tokio::test]
    async fn test_from_fixtures() {
        let json = r#"{
            "products": [{"id": 1, "title": "Sneaker", "price": 139.9, "image": "sneaker.jpg"}],
            "stock": [{"id": 1, "amount": 3}, {"id": 2, "amount": 5}]
        }"#;
        let fixtures: Fixtures = serde_json::from_str(json).unwrap();
        let catalog = InMemoryCatalog::from_fixtures(fixtures);

        assert_eq!(catalog.product(ProductId::new(1)).await.unwrap(), sneaker());
        assert_eq!(catalog.stock(ProductId::new(2)).await.unwrap().amount, 5);
    }

    #[test]
    fn test_fixtures_load_missing_file() {
        let result = Fixtures::load("/definitely/not/here.json");
        assert!(matches!(result, Err(ServiceError::Request(_))));
    }
}
