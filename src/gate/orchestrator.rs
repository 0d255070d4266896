//! Pipeline orchestration for one trade-in request.

use super::decision::{Condition, MissLevel, TradeInDecision};
use crate::catalog::{CatalogCache, HttpCatalogSource};
use crate::config::GateConfig;
use crate::error::Result;
use crate::gateway::{HttpGatewayTransport, VerificationClient, VerificationClientConfig};
use crate::imei::DeviceIdentifier;
use crate::resolver::{resolve, Resolution};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, info};

/// One trade-in request as received from the assistant.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TradeInRequest {
    /// IMEI as typed by the customer.
    pub identifier: String,
    /// Claimed brand.
    #[serde(default)]
    pub brand: Option<String>,
    /// Claimed model.
    #[serde(default)]
    pub model: Option<String>,
    /// Claimed storage capacity.
    #[serde(default)]
    pub capacity: Option<String>,
    /// Declared condition. Missing means good.
    #[serde(default)]
    pub condition_good: Option<bool>,
    /// Customer session token for the gateway.
    #[serde(default)]
    pub session_token: Option<String>,
    /// Customer phone number for the gateway.
    #[serde(default)]
    pub phone_number: Option<String>,
}

impl TradeInRequest {
    /// Request for a device in good condition with no session context.
    #[must_use]
    pub fn new(
        identifier: impl Into<String>,
        brand: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            identifier: identifier.into(),
            brand: Some(brand.into()),
            model: Some(model.into()),
            ..Self::default()
        }
    }
}

/// Orchestrates the trade-in pipeline. Share it behind an `Arc`.
#[derive(Clone)]
pub struct TradeInGate {
    catalog: CatalogCache,
    gateway: VerificationClient,
    portal_url: String,
}

impl TradeInGate {
    /// Create a gate from its collaborators.
    #[must_use]
    pub fn new(
        catalog: CatalogCache,
        gateway: VerificationClient,
        portal_url: impl Into<String>,
    ) -> Self {
        Self {
            catalog,
            gateway,
            portal_url: portal_url.into(),
        }
    }

    /// Create a gate that talks HTTP to the configured upstreams.
    ///
    /// # Errors
    ///
    /// Returns an error if an HTTP client cannot be built.
    pub fn from_config(config: &GateConfig) -> Result<Self> {
        let source = HttpCatalogSource::new(config.catalog.url.clone(), config.catalog.timeout())?;
        let catalog = CatalogCache::new(Arc::new(source), config.catalog.freshness());

        let transport =
            HttpGatewayTransport::new(config.gateway.url.clone(), config.gateway.timeout())?;
        let gateway = VerificationClient::new(
            Arc::new(transport),
            VerificationClientConfig {
                timeout: config.gateway.timeout(),
                require_session_token: config.gateway.require_session_token,
            },
        );

        info!(
            "Trade-in gate initialized (catalog={}, freshness={}s, gateway_timeout={}s)",
            config.catalog.url, config.catalog.freshness_secs, config.gateway.timeout_secs
        );

        Ok(Self::new(catalog, gateway, config.gateway.portal_url.clone()))
    }

    /// The shared catalog cache.
    #[must_use]
    pub fn catalog(&self) -> &CatalogCache {
        &self.catalog
    }

    /// Run the full pipeline for one request.
    pub async fn assess(&self, request: &TradeInRequest) -> TradeInDecision {
        let decision = self.run(request).await;
        info!(
            "Trade-in decision for {}: {}",
            decision.identifier().unwrap_or("<invalid>"),
            decision.status_label()
        );
        decision
    }

    async fn run(&self, request: &TradeInRequest) -> TradeInDecision {
        let identifier = match DeviceIdentifier::parse(&request.identifier) {
            Ok(identifier) => identifier,
            Err(error) => {
                debug!("Rejecting identifier locally: {error}");
                return TradeInDecision::invalid_identifier(error);
            }
        };

        let snapshot = match self.catalog.get().await {
            Ok(snapshot) => snapshot,
            Err(e) => return TradeInDecision::upstream_unavailable(&identifier, e.to_string()),
        };

        let device = match resolve(
            snapshot.catalog(),
            request.brand.as_deref().unwrap_or_default(),
            request.model.as_deref().unwrap_or_default(),
            request.capacity.as_deref(),
        ) {
            Resolution::Found(device) => device,
            Resolution::BrandNotFound {
                query,
                valid_brands,
            } => {
                return TradeInDecision::catalog_miss(
                    &identifier,
                    MissLevel::Brand,
                    query,
                    valid_brands,
                )
            }
            Resolution::ModelNotFound {
                query,
                valid_models,
                ..
            } => {
                return TradeInDecision::catalog_miss(
                    &identifier,
                    MissLevel::Model,
                    query,
                    valid_models,
                )
            }
        };

        let outcome = self
            .gateway
            .verify(
                device.model_code(),
                &identifier,
                request.session_token.as_deref(),
                request.phone_number.as_deref(),
            )
            .await;

        TradeInDecision::from_verification(
            &identifier,
            &device,
            Condition::from_flag(request.condition_good),
            outcome,
            &self.portal_url,
        )
    }
}
