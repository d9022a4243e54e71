//! Stock and catalog services over the storefront's JSON API.

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use super::{CatalogService, ProductRecord, StockRecord, StockService};
use crate::error::ServiceError;
use crate::ids::ProductId;

/// Client for `GET {base}/stock/{id}` and `GET {base}/products/{id}`.
#[derive(Debug, Clone)]
pub struct HttpApi {
    client: reqwest::Client,
    base_url: String,
}

impl HttpApi {
    /// Create a client for the API rooted at `base_url`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    /// Create a client with a per-request timeout.
    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ServiceError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ServiceError::Request(e.to_string()))?;
        Ok(Self::with_client(client, base_url))
    }

    /// Use a preconfigured reqwest client.
    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    /// The API root, without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, resource: &str, id: ProductId) -> String {
        format!("{}/{}/{}", self.base_url, resource, id)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: String) -> Result<T, ServiceError> {
        debug!(%url, "Sending request");
        let resp = self.client.get(&url).send().await.map_err(|e| {
            if e.is_timeout() {
                ServiceError::Timeout(url.clone())
            } else {
                ServiceError::Connection(e.to_string())
            }
        })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(ServiceError::Http {
                status: status.as_u16(),
                url,
            });
        }

        resp.json::<T>()
            .await
            .map_err(|e| ServiceError::Deserialization(e.to_string()))
    }
}

#[async_trait]
impl StockService for HttpApi {
    #[instrument(skip(self))]
    async fn stock(&self, id: ProductId) -> Result<StockRecord, ServiceError> {
        self.get_json(self.url("stock", id)).await
    }
}

#[async_trait]
impl CatalogService for HttpApi {
    #[instrument(skip(self))]
    async fn product(&self, id: ProductId) -> Result<ProductRecord, ServiceError> {
        self.get_json(self.url("products", id)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_urls() {
        let api = HttpApi::new("http://localhost:3333/");
        assert_eq!(api.base_url(), "http://localhost:3333");
        assert_eq!(api.url("stock", ProductId::new(2)), "http://localhost:3333/stock/2");
        assert_eq!(
            api.url("products", ProductId::new(15)),
            "http://localhost:3333/products/15"
        );
    }

    #[tokio::test]
    async fn test_unreachable_host_is_connection_error() {
        // Port 9 (discard) on loopback is closed in test environments
        let api = HttpApi::with_timeout("http://127.0.0.1:9", Duration::from_secs(2)).unwrap();
        let err = api.stock(ProductId::new(1)).await.unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Connection(_) | ServiceError::Timeout(_)
        ));
    }
}
