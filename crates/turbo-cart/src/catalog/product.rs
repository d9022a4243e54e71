//! Product metadata records.

use serde::{Deserialize, Serialize};

/// Display metadata for a product, as reported by the catalog service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProductRecord {
    /// Product title.
    pub title: String,
    /// Unit price.
    pub price: f64,
    /// Image URL.
    pub image: String,
}

impl ProductRecord {
    /// Create a product record.
    pub fn new(title: impl Into<String>, price: f64, image: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            price,
            image: image.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_catalog_payload() {
        let json = r#"{
            "id": 1,
            "title": "Tênis de Caminhada Leve Confortável",
            "price": 179.9,
            "image": "https://rocketseat-cdn.s3-sa-east-1.amazonaws.com/modulo-redux/tenis1.jpg"
        }"#;
        let product: ProductRecord = serde_json::from_str(json).unwrap();
        assert_eq!(product.title, "Tênis de Caminhada Leve Confortável");
        assert_eq!(product.price, 179.9);
    }

    #[test]
    fn test_missing_field_is_error() {
        assert!(serde_json::from_str::<ProductRecord>(r#"{"title":"x","price":1}"#).is_err());
    }
}
