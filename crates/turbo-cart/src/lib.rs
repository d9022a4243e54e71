//! Client-side shopping cart state for TurboCart storefronts.
//!
//! This crate keeps the shopper's cart in memory, validates every change
//! against a stock service, saves the whole cart to a key-value store after
//! each change, and pushes new snapshots to whoever is rendering it.
//!
//! - **Cart**: [`Cart`] and [`LineItem`], at most one item per product
//! - **Catalog**: [`StockService`] / [`CatalogService`] traits, with an
//!   in-memory implementation and (feature `http`) a JSON API client
//! - **Store**: [`CartStore`], the only way to change a cart
//! - **Notifications**: [`Notification`], one per failed change
//!
//! # Example
//!
//! ```rust,ignore
//! use turbo_cart::prelude::*;
//! use turbo_cache::FileStore;
//!
//! let api = HttpApi::new("http://localhost:3333");
//! let store = CartStore::open(FileStore::open(".turbo-cart")?, api.clone(), api);
//!
//! let mut notes = store.notifications();
//! store.add_product(ProductId::new(1)).await.ok();
//! store.update_product_amount(ProductId::new(1), 3).await.ok();
//!
//! for item in store.cart().iter() {
//!     println!("{} x{}", item.title, item.amount);
//! }
//! ```

pub mod cart;
pub mod catalog;
pub mod config;
pub mod error;
pub mod ids;
pub mod notify;
pub mod store;

pub use cart::{Cart, LineItem};
pub use catalog::{
    CatalogService, Fixtures, InMemoryCatalog, ProductRecord, StockRecord, StockService,
};
pub use config::StoreConfig;
pub use error::{CartError, InvalidCart, ServiceError};
pub use ids::ProductId;
pub use notify::Notification;
pub use store::CartStore;

#[cfg(feature = "http")]
pub use catalog::HttpApi;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::cart::{Cart, LineItem};
    pub use crate::catalog::{
        CatalogService, Fixtures, InMemoryCatalog, ProductRecord, StockRecord, StockService,
    };
    pub use crate::config::StoreConfig;
    pub use crate::error::{CartError, ServiceError};
    pub use crate::ids::ProductId;
    pub use crate::notify::Notification;
    pub use crate::store::CartStore;

    #[cfg(feature = "http")]
    pub use crate::catalog::HttpApi;
}
