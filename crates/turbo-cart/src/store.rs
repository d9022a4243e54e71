//! The cart store: validated, persisted, observable cart mutations.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, watch, Mutex};
use tracing::{debug, error, info, instrument, warn};
use turbo_cache::{Cache, KvStore};

use crate::cart::{Cart, LineItem};
use crate::catalog::{CatalogService, StockService};
use crate::config::StoreConfig;
use crate::error::{CartError, ServiceError};
use crate::ids::ProductId;
use crate::notify::{Notification, Notifier};

/// Owner of the shopper's cart.
///
/// Every change goes through [`add_product`](Self::add_product),
/// [`remove_product`](Self::remove_product),
/// [`update_product_amount`](Self::update_product_amount) or
/// [`clear`](Self::clear). Each one validates against the stock service,
/// writes the whole cart to storage, and only then publishes the new
/// snapshot. On failure the cart is left as it was and a [`Notification`] is
/// broadcast; the same error is also returned to the caller.
///
/// Mutations are serialized: one operation runs at a time per store,
/// including while it waits on the stock and catalog services. Readers never
/// wait; they see the last committed snapshot.
///
/// The handle is cheap to clone and all clones share one cart.
///
/// # Example
///
/// ```rust,ignore
/// let catalog = InMemoryCatalog::new().with_product(ProductId::new(1), sneaker, 5);
/// let store = CartStore::open(MemoryStore::new(), catalog.clone(), catalog);
///
/// store.add_product(ProductId::new(1)).await?;
/// assert_eq!(store.cart().item_count(), 1);
/// ```
#[derive(Clone)]
pub struct CartStore {
    inner: Arc<Inner>,
}

struct Inner {
    stock: Box<dyn StockService>,
    catalog: Box<dyn CatalogService>,
    cache: Cache,
    storage_key: String,
    service_timeout: Option<Duration>,
    snapshot: watch::Sender<Arc<Cart>>,
    notifier: Notifier,
    mutation: Mutex<()>,
}

impl CartStore {
    /// Open a store with the default configuration, restoring any saved cart.
    pub fn open<K, S, C>(storage: K, stock: S, catalog: C) -> Self
    where
        K: KvStore + 'static,
        S: StockService + 'static,
        C: CatalogService + 'static,
    {
        Self::open_with_config(storage, stock, catalog, StoreConfig::default())
    }

    /// Open a store, restoring any cart saved under `config.storage_key`.
    ///
    /// A missing, unreadable or invalid saved cart yields an empty cart.
    pub fn open_with_config<K, S, C>(storage: K, stock: S, catalog: C, config: StoreConfig) -> Self
    where
        K: KvStore + 'static,
        S: StockService + 'static,
        C: CatalogService + 'static,
    {
        let cache = Cache::new(storage);
        let initial = restore(&cache, &config.storage_key);
        let (snapshot, _) = watch::channel(Arc::new(initial));

        Self {
            inner: Arc::new(Inner {
                stock: Box::new(stock),
                catalog: Box::new(catalog),
                cache,
                storage_key: config.storage_key.clone(),
                service_timeout: config.service_timeout(),
                snapshot,
                notifier: Notifier::new(config.notification_capacity),
                mutation: Mutex::new(()),
            }),
        }
    }

    /// Current cart snapshot.
    pub fn cart(&self) -> Arc<Cart> {
        self.inner.snapshot.borrow().clone()
    }

    /// Watch the cart. The receiver yields each committed snapshot.
    pub fn subscribe(&self) -> watch::Receiver<Arc<Cart>> {
        self.inner.snapshot.subscribe()
    }

    /// Listen for failure notifications.
    pub fn notifications(&self) -> broadcast::Receiver<Notification> {
        self.inner.notifier.subscribe()
    }

    /// Key the cart is saved under.
    pub fn storage_key(&self) -> &str {
        &self.inner.storage_key
    }

    /// Add one unit of a product.
    ///
    /// A product not yet in the cart is added with amount 1 and metadata
    /// from the catalog. A product already in the cart gets its amount
    /// incremented, as long as the stock allows it.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn add_product(&self, product_id: ProductId) -> Result<(), CartError> {
        let _guard = self.inner.mutation.lock().await;
        let result = self.try_add(product_id).await;
        self.report(result)
    }

    /// Remove a product from the cart.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn remove_product(&self, product_id: ProductId) -> Result<(), CartError> {
        let _guard = self.inner.mutation.lock().await;
        let result = self.try_remove(product_id);
        self.report(result)
    }

    /// Set the amount of a product already in the cart.
    ///
    /// Non-positive amounts are ignored. So is a product that is not in the
    /// cart, unlike [`remove_product`](Self::remove_product) which reports
    /// it.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn update_product_amount(
        &self,
        product_id: ProductId,
        amount: i64,
    ) -> Result<(), CartError> {
        if amount <= 0 {
            debug!(amount, "Ignoring non-positive amount");
            return Ok(());
        }

        let _guard = self.inner.mutation.lock().await;
        let result = self.try_update(product_id, amount).await;
        self.report(result)
    }

    /// Remove every item.
    #[instrument(skip(self))]
    pub async fn clear(&self) -> Result<(), CartError> {
        let _guard = self.inner.mutation.lock().await;
        if self.cart().is_empty() {
            return Ok(());
        }
        let mut next = Cart::clone(&self.cart());
        next.clear();
        let result = self.commit(next);
        self.report(result)
    }

    async fn try_add(&self, product_id: ProductId) -> Result<(), CartError> {
        let add_failed = |source| CartError::AddFailed { product_id, source };

        let stock = self
            .call(self.inner.stock.stock(product_id))
            .await
            .map_err(add_failed)?;

        let current = self.cart();
        let existing = current.get(product_id);
        let requested = match existing {
            Some(item) => item.amount.checked_add(1),
            None => Some(1),
        };
        let Some(requested) = requested else {
            return Err(CartError::OutOfStock {
                product_id,
                requested: i64::MAX,
                available: stock.amount,
            });
        };

        if stock.is_out_of_stock() || !stock.can_fulfill(requested) {
            return Err(CartError::OutOfStock {
                product_id,
                requested,
                available: stock.amount,
            });
        }

        let item = match existing {
            Some(item) => item.with_amount(requested),
            None => {
                let product = self
                    .call(self.inner.catalog.product(product_id))
                    .await
                    .map_err(add_failed)?;
                LineItem::from_product(product_id, product, 1)
            }
        };

        let mut next = Cart::clone(&current);
        next.put(item);
        self.commit(next)?;
        info!(amount = requested, "Product added");
        Ok(())
    }

    fn try_remove(&self, product_id: ProductId) -> Result<(), CartError> {
        let mut next = Cart::clone(&self.cart());
        if !next.remove(product_id) {
            return Err(CartError::NotFound(product_id));
        }
        self.commit(next)?;
        info!("Product removed");
        Ok(())
    }

    async fn try_update(&self, product_id: ProductId, amount: i64) -> Result<(), CartError> {
        let stock = self
            .call(self.inner.stock.stock(product_id))
            .await
            .map_err(|source| CartError::UpdateFailed { product_id, source })?;

        let current = self.cart();
        let Some(existing) = current.get(product_id) else {
            debug!("Product not in cart; nothing to update");
            return Ok(());
        };

        if !stock.can_fulfill(amount) {
            return Err(CartError::OutOfStock {
                product_id,
                requested: amount,
                available: stock.amount,
            });
        }

        let mut next = Cart::clone(&current);
        next.put(existing.with_amount(amount));
        self.commit(next)?;
        info!(amount, "Product amount updated");
        Ok(())
    }

    /// Persist `next`, then publish it.
    ///
    /// Readers never observe a cart that is not also in storage.
    fn commit(&self, next: Cart) -> Result<(), CartError> {
        self.inner.cache.set(&self.inner.storage_key, &next)?;
        self.inner.snapshot.send_replace(Arc::new(next));
        Ok(())
    }

    async fn call<T>(
        &self,
        request: impl Future<Output = Result<T, ServiceError>>,
    ) -> Result<T, ServiceError> {
        match self.inner.service_timeout {
            Some(limit) => tokio::time::timeout(limit, request)
                .await
                .map_err(|_| ServiceError::Timeout(format!("no response within {:?}", limit)))?,
            None => request.await,
        }
    }

    fn report(&self, result: Result<(), CartError>) -> Result<(), CartError> {
        if let Err(e) = &result {
            match e {
                CartError::OutOfStock { .. } | CartError::NotFound(_) => {
                    warn!(error = %e, "Cart change rejected")
                }
                _ => error!(error = %e, "Cart change failed"),
            }
            self.inner.notifier.notify(e.notification());
        }
        result
    }
}

impl std::fmt::Debug for CartStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartStore")
            .field("storage_key", &self.inner.storage_key)
            .field("items", &self.cart().len())
            .finish_non_exhaustive()
    }
}

fn restore(cache: &Cache, key: &str) -> Cart {
    match cache.get::<Cart>(key) {
        Ok(Some(cart)) => {
            info!(key, items = cart.len(), "Restored saved cart");
            cart
        }
        Ok(None) => {
            debug!(key, "No saved cart");
            Cart::new()
        }
        Err(e) => {
            warn!(key, error = %e, "Saved cart unreadable; starting empty");
            Cart::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{InMemoryCatalog, ProductRecord};
    use turbo_cache::{CacheError, MemoryStore};

    fn sneaker() -> ProductRecord {
        ProductRecord::new("Tênis de Caminhada", 179.9, "tenis1.jpg")
    }

    fn setup(stock: i64) -> (CartStore, InMemoryCatalog, MemoryStore) {
        let catalog = InMemoryCatalog::new().with_product(ProductId::new(1), sneaker(), stock);
        let storage = MemoryStore::new();
        let store = CartStore::open(storage.clone(), catalog.clone(), catalog.clone());
        (store, catalog, storage)
    }

    fn saved(storage: &MemoryStore) -> Option<Cart> {
        Cache::new(storage.clone()).get("@RocketShoes:cart").unwrap()
    }

    /// Store whose writes always fail.
    struct ReadOnlyStore(MemoryStore);

    impl KvStore for ReadOnlyStore {
        fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
            self.0.get(key)
        }

        fn set(&self, _key: &str, _value: &str) -> Result<(), CacheError> {
            Err(CacheError::StoreError("read-only".to_string()))
        }

        fn delete(&self, _key: &str) -> Result<(), CacheError> {
            Err(CacheError::StoreError("read-only".to_string()))
        }
    }

    #[tokio::test]
    async fn test_add_new_product() {
        let (store, _, storage) = setup(5);
        store.add_product(ProductId::new(1)).await.unwrap();

        let cart = store.cart();
        let item = cart.get(ProductId::new(1)).unwrap();
        assert_eq!(item.amount, 1);
        assert_eq!(item.title, "Tênis de Caminhada");
        assert_eq!(item.price, 179.9);
        assert_eq!(item.image, "tenis1.jpg");
        assert_eq!(saved(&storage).as_ref(), Some(&*cart));
    }

    #[tokio::test]
    async fn test_add_out_of_stock() {
        let (store, _, storage) = setup(0);
        let mut notes = store.notifications();

        let err = store.add_product(ProductId::new(1)).await.unwrap_err();
        assert!(matches!(err, CartError::OutOfStock { available: 0, .. }));
        assert!(store.cart().is_empty());
        assert!(storage.is_empty());
        assert_eq!(notes.try_recv().unwrap(), Notification::OutOfStock(ProductId::new(1)));
    }

    #[tokio::test]
    async fn test_increment_bounded_by_stock() {
        let (store, _, _) = setup(2);
        store.add_product(ProductId::new(1)).await.unwrap();
        store.add_product(ProductId::new(1)).await.unwrap();

        let err = store.add_product(ProductId::new(1)).await.unwrap_err();
        assert!(matches!(
            err,
            CartError::OutOfStock { requested: 3, available: 2, .. }
        ));
        assert_eq!(store.cart().get(ProductId::new(1)).unwrap().amount, 2);
    }

    #[tokio::test]
    async fn test_add_service_error_is_add_failed() {
        let (store, catalog, _) = setup(5);
        catalog.set_failure(Some(ServiceError::Connection("refused".into())));
        let mut notes = store.notifications();

        let err = store.add_product(ProductId::new(1)).await.unwrap_err();
        assert!(matches!(err, CartError::AddFailed { .. }));
        assert!(store.cart().is_empty());
        assert_eq!(notes.try_recv().unwrap(), Notification::AddFailed(ProductId::new(1)));
    }

    #[tokio::test]
    async fn test_add_catalog_miss_is_add_failed() {
        let catalog = InMemoryCatalog::new().with_stock(ProductId::new(8), 4);
        let store = CartStore::open(MemoryStore::new(), catalog.clone(), catalog);

        let err = store.add_product(ProductId::new(8)).await.unwrap_err();
        assert!(matches!(
            err,
            CartError::AddFailed { source: ServiceError::UnknownProduct(_), .. }
        ));
        assert!(store.cart().is_empty());
    }

    #[tokio::test]
    async fn test_remove_missing_is_not_found() {
        let (store, _, storage) = setup(5);
        let mut notes = store.notifications();

        let err = store.remove_product(ProductId::new(1)).await.unwrap_err();
        assert!(matches!(err, CartError::NotFound(_)));
        assert!(storage.is_empty());
        assert_eq!(notes.try_recv().unwrap(), Notification::NotFound(ProductId::new(1)));
    }

    #[tokio::test]
    async fn test_update_non_positive_is_silent() {
        let (store, catalog, _) = setup(5);
        store.add_product(ProductId::new(1)).await.unwrap();
        let mut notes = store.notifications();

        // No stock lookup happens either: a failing service is never hit.
        catalog.set_failure(Some(ServiceError::Connection("refused".into())));
        store.update_product_amount(ProductId::new(1), 0).await.unwrap();
        store.update_product_amount(ProductId::new(1), -3).await.unwrap();

        assert_eq!(store.cart().get(ProductId::new(1)).unwrap().amount, 1);
        assert!(notes.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_update_absent_is_silent() {
        let (store, _, storage) = setup(5);
        let mut notes = store.notifications();

        store.update_product_amount(ProductId::new(1), 2).await.unwrap();
        assert!(store.cart().is_empty());
        assert!(storage.is_empty());
        assert!(notes.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_update_service_error_is_update_failed() {
        let (store, catalog, _) = setup(5);
        store.add_product(ProductId::new(1)).await.unwrap();
        catalog.set_failure(Some(ServiceError::Timeout("stock".into())));

        let err = store.update_product_amount(ProductId::new(1), 2).await.unwrap_err();
        assert!(matches!(err, CartError::UpdateFailed { .. }));
        assert_eq!(store.cart().get(ProductId::new(1)).unwrap().amount, 1);
    }

    #[tokio::test]
    async fn test_persist_failure_leaves_cart_unchanged() {
        let catalog = InMemoryCatalog::new().with_product(ProductId::new(1), sneaker(), 5);
        let store = CartStore::open(ReadOnlyStore(MemoryStore::new()), catalog.clone(), catalog);
        let mut notes = store.notifications();

        let err = store.add_product(ProductId::new(1)).await.unwrap_err();
        assert!(matches!(err, CartError::Persist(_)));
        assert!(store.cart().is_empty());
        assert_eq!(notes.try_recv().unwrap(), Notification::PersistFailed);
    }

    #[tokio::test]
    async fn test_remove_persist_failure_leaves_cart_unchanged() {
        let storage = MemoryStore::new();
        storage
            .set(
                "@RocketShoes:cart",
                r#"[{"id":1,"title":"Tênis","price":179.9,"image":"t.jpg","amount":2}]"#,
            )
            .unwrap();
        let catalog = InMemoryCatalog::new().with_product(ProductId::new(1), sneaker(), 5);
        let store = CartStore::open(ReadOnlyStore(storage.clone()), catalog.clone(), catalog);
        let before = store.cart();
        let mut notes = store.notifications();

        let err = store.remove_product(ProductId::new(1)).await.unwrap_err();
        assert!(matches!(err, CartError::Persist(_)));
        assert_eq!(*store.cart(), *before);
        assert_eq!(saved(&storage).as_ref(), Some(&*before));
        assert_eq!(notes.try_recv().unwrap(), Notification::PersistFailed);
    }

    #[tokio::test]
    async fn test_update_persist_failure_leaves_cart_unchanged() {
        let storage = MemoryStore::new();
        storage
            .set(
                "@RocketShoes:cart",
                r#"[{"id":1,"title":"Tênis","price":179.9,"image":"t.jpg","amount":2}]"#,
            )
            .unwrap();
        let catalog = InMemoryCatalog::new().with_product(ProductId::new(1), sneaker(), 5);
        let store = CartStore::open(ReadOnlyStore(storage.clone()), catalog.clone(), catalog);
        let before = store.cart();
        let mut notes = store.notifications();

        let err = store.update_product_amount(ProductId::new(1), 4).await.unwrap_err();
        assert!(matches!(err, CartError::Persist(_)));
        assert_eq!(store.cart().get(ProductId::new(1)).unwrap().amount, 2);
        assert_eq!(*store.cart(), *before);
        assert_eq!(notes.try_recv().unwrap(), Notification::PersistFailed);
    }

    #[tokio::test]
    async fn test_restore_saved_cart() {
        let (store, catalog, storage) = setup(5);
        store.add_product(ProductId::new(1)).await.unwrap();
        store.add_product(ProductId::new(1)).await.unwrap();

        let reopened = CartStore::open(storage, catalog.clone(), catalog);
        assert_eq!(*reopened.cart(), *store.cart());
    }

    #[tokio::test]
    async fn test_restore_corrupt_blob_starts_empty() {
        let storage = MemoryStore::new();
        storage.set("@RocketShoes:cart", "[{\"id\":1,").unwrap();
        let catalog = InMemoryCatalog::new();

        let store = CartStore::open(storage, catalog.clone(), catalog);
        assert!(store.cart().is_empty());
    }

    #[tokio::test]
    async fn test_service_timeout() {
        let catalog = InMemoryCatalog::new()
            .with_product(ProductId::new(1), sneaker(), 5)
            .with_latency(Duration::from_millis(200));
        let config = StoreConfig::default().with_service_timeout(Duration::from_millis(10));
        let store = CartStore::open_with_config(MemoryStore::new(), catalog.clone(), catalog, config);

        let err = store.add_product(ProductId::new(1)).await.unwrap_err();
        assert!(matches!(
            err,
            CartError::AddFailed { source: ServiceError::Timeout(_), .. }
        ));
    }

    #[tokio::test]
    async fn test_clear() {
        let (store, _, storage) = setup(5);
        store.clear().await.unwrap();
        assert!(storage.is_empty());

        store.add_product(ProductId::new(1)).await.unwrap();
        store.clear().await.unwrap();
        assert!(store.cart().is_empty());
        assert_eq!(saved(&storage), Some(Cart::new()));
    }

    #[tokio::test]
    async fn test_subscribers_see_commits() {
        let (store, _, _) = setup(5);
        let mut rx = store.subscribe();

        store.add_product(ProductId::new(1)).await.unwrap();
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow_and_update().item_count(), 1);

        // Rejected change publishes nothing
        let _ = store.remove_product(ProductId::new(2)).await;
        assert!(!rx.has_changed().unwrap());
    }
}
