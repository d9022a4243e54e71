//! Type-safe Key-Value storage layer for TurboCart.
//!
//! Provides a small [`KvStore`] trait for string-keyed blob storage, two
//! backends ([`MemoryStore`] and the durable [`FileStore`]), and a [`Cache`]
//! wrapper with automatic JSON serialization.
//!
//! # Example
//!
//! ```rust,ignore
//! use turbo_cache::{Cache, FileStore};
//! use serde::{Serialize, Deserialize};
//!
//! #[derive(Serialize, Deserialize)]
//! struct Cart {
//!     items: Vec<CartItem>,
//! }
//!
//! let cache = Cache::new(FileStore::open(".turbo-cart")?);
//!
//! // Store a value
//! cache.set("@RocketShoes:cart", &cart)?;
//!
//! // Retrieve a value
//! let cart: Option<Cart> = cache.get("@RocketShoes:cart")?;
//!
//! // Delete a value
//! cache.delete("@RocketShoes:cart")?;
//! ```

mod error;
mod file;
mod kv;
mod memory;

pub use error::CacheError;
pub use file::FileStore;
pub use kv::{Cache, KvStore};
pub use memory::MemoryStore;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{Cache, CacheError, FileStore, KvStore, MemoryStore};
}
