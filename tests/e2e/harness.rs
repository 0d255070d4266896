//! Test harness wiring the gate to stub collaborators.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tradein_gate::catalog::{
    Brand, CatalogCache, CatalogSource, Clock, Model, TradeInCatalog, Variant,
};
use tradein_gate::gate::{TradeInDecision, TradeInGate, TradeInRequest};
use tradein_gate::gateway::{
    GatewayResponse, GatewayTransport, TransportError, VerificationClient,
    VerificationClientConfig, VerificationQuery,
};
use tradein_gate::{Error, Result};

/// Canonical valid IMEI fixture.
pub const VALID_IMEI: &str = "490154203237518";

/// Portal URL the harness configures.
pub const PORTAL_URL: &str = "https://portal.example.test/verify";

/// Freshness window used by the harness cache.
pub const FRESHNESS: Duration = Duration::from_secs(15 * 60);

/// Clock advanced by hand.
pub struct ManualClock(Mutex<Instant>);

impl ManualClock {
    fn new() -> Self {
        Self(Mutex::new(Instant::now()))
    }

    /// Move time forward.
    pub fn advance(&self, by: Duration) {
        *self.0.lock() += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        *self.0.lock()
    }
}

/// Catalog source serving a fixed phone catalog.
#[derive(Default)]
pub struct StubCatalog {
    calls: AtomicUsize,
    failing: AtomicBool,
}

impl StubCatalog {
    /// Number of fetches so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Make subsequent fetches fail.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

#[async_trait]
impl CatalogSource for StubCatalog {
    async fn fetch(&self) -> Result<TradeInCatalog> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(Error::Network("catalog host unreachable".to_string()));
        }
        Ok(TradeInCatalog::new(vec![
            Brand::new(
                "Apple",
                vec![
                    Model::new(
                        "iPhone 15 Pro Max",
                        vec![
                            Variant::new("256GB", 800.0, "APL-15PM-256"),
                            Variant::new("512GB", 950.0, "APL-15PM-512"),
                        ],
                    ),
                    Model::new("iPhone 15", vec![Variant::new("128GB", 500.0, "APL-15-128")]),
                ],
            ),
            Brand::new(
                "Samsung",
                vec![Model::new(
                    "Galaxy S24",
                    vec![Variant::new("256GB", 451.0, "SAM-S24-256")],
                )],
            ),
        ]))
    }
}

/// Gateway that replays a scripted reply and records model codes.
pub struct ScriptedGateway {
    reply: Mutex<std::result::Result<GatewayResponse, TransportError>>,
    model_codes: Mutex<Vec<String>>,
}

impl ScriptedGateway {
    fn new() -> Self {
        Self {
            reply: Mutex::new(Ok(GatewayResponse {
                status: 200,
                body: "{}".to_string(),
            })),
            model_codes: Mutex::new(Vec::new()),
        }
    }

    /// Number of gateway calls so far.
    pub fn calls(&self) -> usize {
        self.model_codes.lock().len()
    }

    /// Model codes sent, in order.
    pub fn model_codes(&self) -> Vec<String> {
        self.model_codes.lock().clone()
    }
}

#[async_trait]
impl GatewayTransport for ScriptedGateway {
    async fn send(
        &self,
        query: &VerificationQuery<'_>,
    ) -> std::result::Result<GatewayResponse, TransportError> {
        self.model_codes.lock().push(query.model_code.to_string());
        self.reply.lock().clone()
    }
}

/// A gate wired to stubs.
pub struct TestHarness {
    /// The gate under test.
    pub gate: TradeInGate,
    /// Catalog stub.
    pub catalog: Arc<StubCatalog>,
    /// Gateway stub.
    pub gateway: Arc<ScriptedGateway>,
    /// Cache clock.
    pub clock: Arc<ManualClock>,
}

impl TestHarness {
    /// Gate with a verifying gateway and a healthy catalog.
    pub fn setup() -> Self {
        let catalog = Arc::new(StubCatalog::default());
        let gateway = Arc::new(ScriptedGateway::new());
        let clock = Arc::new(ManualClock::new());

        let cache = CatalogCache::with_clock(catalog.clone(), FRESHNESS, clock.clone());
        let client = VerificationClient::new(gateway.clone(), VerificationClientConfig::default());

        Self {
            gate: TradeInGate::new(cache, client, PORTAL_URL),
            catalog,
            gateway,
            clock,
        }
    }

    /// Script the gateway's replies.
    pub fn respond(&self, status: u16, body: &str) {
        *self.gateway.reply.lock() = Ok(GatewayResponse {
            status,
            body: body.to_string(),
        });
    }

    /// Script a transport failure.
    pub fn fail_transport(&self, error: TransportError) {
        *self.gateway.reply.lock() = Err(error);
    }

    /// Assess a request.
    pub async fn assess(&self, request: &TradeInRequest) -> TradeInDecision {
        self.gate.assess(request).await
    }

    /// Request for the canonical Apple fixture.
    pub fn pro_max_request(condition_good: bool) -> TradeInRequest {
        TradeInRequest {
            condition_good: Some(condition_good),
            ..TradeInRequest::new(VALID_IMEI, "Apple", "iPhone 15 Pro Max")
        }
    }
}
