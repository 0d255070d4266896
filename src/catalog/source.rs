//! Upstream catalog source.

use super::model::TradeInCatalog;
use crate::error::{Error, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

/// Where catalog snapshots come from.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Fetch and decode a fresh catalog.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Network`] on transport failure or non-success status,
    /// [`Error::Decode`] when the body cannot be decoded.
    async fn fetch(&self) -> Result<TradeInCatalog>;
}

/// Fetches the catalog document over HTTP GET. No authentication.
#[derive(Debug, Clone)]
pub struct HttpCatalogSource {
    client: Client,
    url: String,
}

impl HttpCatalogSource {
    /// Create a source for `url` with a per-request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("tradein-gate/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::Network(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }

    /// The upstream URL.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl CatalogSource for HttpCatalogSource {
    async fn fetch(&self) -> Result<TradeInCatalog> {
        debug!("Fetching trade-in catalog from {}", self.url);

        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| Error::Network(format!("Catalog request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Network(format!(
                "Catalog request returned HTTP {status}"
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| Error::Network(format!("Catalog body read failed: {e}")))?;

        TradeInCatalog::from_json(&body)
    }
}
