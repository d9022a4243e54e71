//! Cart and line item types.

use crate::catalog::ProductRecord;
use crate::error::InvalidCart;
use crate::ids::ProductId;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A line item in the cart.
///
/// Field order is the storage order: id, title, price, image, amount.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LineItem {
    /// Product identifier.
    pub id: ProductId,
    /// Product title (denormalized for display).
    pub title: String,
    /// Unit price as reported by the catalog.
    pub price: f64,
    /// Product image URL.
    pub image: String,
    /// Quantity held in the cart.
    pub amount: i64,
}

impl LineItem {
    /// Create a line item from catalog metadata.
    pub fn from_product(id: ProductId, product: ProductRecord, amount: i64) -> Self {
        Self {
            id,
            title: product.title,
            price: product.price,
            image: product.image,
            amount,
        }
    }

    /// Same item with a different amount. Metadata is carried over untouched.
    pub fn with_amount(&self, amount: i64) -> Self {
        Self {
            amount,
            ..self.clone()
        }
    }

    /// Price times amount, for display.
    pub fn subtotal(&self) -> f64 {
        self.price * self.amount as f64
    }
}

/// A shopping cart.
///
/// Holds at most one [`LineItem`] per product and never an item with an
/// amount below one. Serialized as a bare JSON array of line items;
/// deserializing an array that breaks either rule fails.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(try_from = "Vec<LineItem>", into = "Vec<LineItem>")]
pub struct Cart {
    items: Vec<LineItem>,
}

impl Cart {
    /// Create an empty cart.
    pub fn new() -> Self {
        Self::default()
    }

    /// Items in cart order.
    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    /// Iterate over the items.
    pub fn iter(&self) -> std::slice::Iter<'_, LineItem> {
        self.items.iter()
    }

    /// Get an item by product ID.
    pub fn get(&self, id: ProductId) -> Option<&LineItem> {
        self.items.iter().find(|i| i.id == id)
    }

    /// Check if the product is in the cart.
    pub fn contains(&self, id: ProductId) -> bool {
        self.get(id).is_some()
    }

    /// Get number of unique items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if cart is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Get total item count (sum of amounts).
    pub fn item_count(&self) -> i64 {
        self.items.iter().map(|i| i.amount).sum()
    }

    /// Insert `item`, replacing any item for the same product.
    ///
    /// The item always ends up last, whether it replaced an existing entry or
    /// not.
    pub(crate) fn put(&mut self, item: LineItem) {
        debug_assert!(item.amount >= 1, "line item amount must be positive");
        self.items.retain(|i| i.id != item.id);
        self.items.push(item);
    }

    /// Remove the item for a product. Returns whether anything was removed.
    pub(crate) fn remove(&mut self, id: ProductId) -> bool {
        let len_before = self.items.len();
        self.items.retain(|i| i.id != id);
        self.items.len() < len_before
    }

    /// Clear all items from the cart.
    pub(crate) fn clear(&mut self) {
        self.items.clear();
    }
}

impl TryFrom<Vec<LineItem>> for Cart {
    type Error = InvalidCart;

    fn try_from(items: Vec<LineItem>) -> Result<Self, Self::Error> {
        let mut seen = HashSet::with_capacity(items.len());
        for item in &items {
            if item.amount < 1 {
                return Err(InvalidCart::NonPositiveAmount {
                    product_id: item.id,
                    amount: item.amount,
                });
            }
            if !seen.insert(item.id) {
                return Err(InvalidCart::DuplicateItem(item.id));
            }
        }
        Ok(Self { items })
    }
}

impl From<Cart> for Vec<LineItem> {
    fn from(cart: Cart) -> Self {
        cart.items
    }
}

impl<'a> IntoIterator for &'a Cart {
    type Item = &'a LineItem;
    type IntoIter = std::slice::Iter<'a, LineItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: u64, amount: i64) -> LineItem {
        LineItem {
            id: ProductId::new(id),
            title: format!("Sneaker {}", id),
            price: 139.9,
            image: format!("https://cdn.example.com/{}.jpg", id),
            amount,
        }
    }

    #[test]
    fn test_cart_creation() {
        let cart = Cart::new();
        assert!(cart.is_empty());
        assert_eq!(cart.item_count(), 0);
    }

    #[test]
    fn test_put_appends_new_item() {
        let mut cart = Cart::new();
        cart.put(item(1, 1));
        cart.put(item(2, 3));

        assert_eq!(cart.len(), 2);
        assert_eq!(cart.item_count(), 4);
        assert!(cart.contains(ProductId::new(2)));
    }

    #[test]
    fn test_put_replaces_and_moves_to_end() {
        let mut cart = Cart::new();
        cart.put(item(1, 1));
        cart.put(item(2, 1));
        cart.put(item(1, 5));

        let ids: Vec<u64> = cart.iter().map(|i| i.id.get()).collect();
        assert_eq!(ids, vec![2, 1]);
        assert_eq!(cart.get(ProductId::new(1)).unwrap().amount, 5);
    }

    #[test]
    fn test_remove_item() {
        let mut cart = Cart::new();
        cart.put(item(1, 1));
        cart.put(item(2, 2));

        assert!(cart.remove(ProductId::new(1)));
        assert!(!cart.remove(ProductId::new(1)));
        assert_eq!(cart.items(), &[item(2, 2)]);
    }

    #[test]
    fn test_with_amount_keeps_metadata() {
        let original = item(4, 1);
        let updated = original.with_amount(3);
        assert_eq!(updated.amount, 3);
        assert_eq!(updated.title, original.title);
        assert_eq!(updated.image, original.image);
        assert_eq!(updated.price, original.price);
    }

    #[test]
    fn test_subtotal() {
        let mut line = item(1, 2);
        line.price = 10.5;
        assert_eq!(line.subtotal(), 21.0);
    }

    #[test]
    fn test_serialized_shape() {
        let mut cart = Cart::new();
        cart.put(LineItem {
            id: ProductId::new(1),
            title: "Tênis de Caminhada".into(),
            price: 179.9,
            image: "shoe.jpg".into(),
            amount: 2,
        });

        let json = serde_json::to_string(&cart).unwrap();
        assert_eq!(
            json,
            r#"[{"id":1,"title":"Tênis de Caminhada","price":179.9,"image":"shoe.jpg","amount":2}]"#
        );
    }

    #[test]
    fn test_deserialize_rejects_duplicates() {
        let json = r#"[
            {"id":1,"title":"a","price":1.0,"image":"a","amount":1},
            {"id":1,"title":"a","price":1.0,"image":"a","amount":2}
        ]"#;
        assert!(serde_json::from_str::<Cart>(json).is_err());
        assert_eq!(
            Cart::try_from(vec![item(1, 1), item(1, 2)]),
            Err(InvalidCart::DuplicateItem(ProductId::new(1)))
        );
    }

    #[test]
    fn test_deserialize_rejects_zero_amount() {
        let json = r#"[{"id":1,"title":"a","price":1.0,"image":"a","amount":0}]"#;
        assert!(serde_json::from_str::<Cart>(json).is_err());
    }

    #[test]
    fn test_storage_roundtrip() {
        let cart = Cart::try_from(vec![item(3, 2), item(1, 1)]).unwrap();
        let json = serde_json::to_string(&cart).unwrap();
        let restored: Cart = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, cart);
    }
}
