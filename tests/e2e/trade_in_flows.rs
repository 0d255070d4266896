//! Trade-in scenarios through the full pipeline.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use super::{TestHarness, FRESHNESS, PORTAL_URL, VALID_IMEI};
use std::time::Duration;
use tradein_gate::gate::{BlockReason, Condition, MissLevel, TradeInRequest};
use tradein_gate::gateway::{TransportError, UnverifiableReason, VerificationStatus};
use tradein_gate::imei::ImeiError;

#[tokio::test]
async fn test_verified_good_condition_discloses_full_price() {
    let harness = TestHarness::setup();
    harness.respond(200, r#"{"code":1000,"message":"OK"}"#);

    let decision = harness.assess(&TestHarness::pro_max_request(true)).await;

    assert_eq!(decision.value(), Some(800));
    let disclosed = decision.disclosed().expect("disclosed");
    assert_eq!(disclosed.condition(), Condition::Good);
    assert_eq!(disclosed.variants().len(), 2);
    assert_eq!(harness.gateway.model_codes(), vec!["APL-15PM-256".to_string()]);
    assert!(decision.explanation().contains("800"));
}

#[tokio::test]
async fn test_verified_poor_condition_halves_price() {
    let harness = TestHarness::setup();

    let decision = harness.assess(&TestHarness::pro_max_request(false)).await;

    assert_eq!(decision.value(), Some(400));
}

#[tokio::test]
async fn test_poor_condition_rounds_to_whole_units() {
    let harness = TestHarness::setup();
    let request = TradeInRequest {
        condition_good: Some(false),
        ..TradeInRequest::new(VALID_IMEI, "Samsung", "Galaxy S24")
    };

    let decision = harness.assess(&request).await;

    // 451 * 0.5 = 225.5
    assert_eq!(decision.value(), Some(226));
}

#[tokio::test]
async fn test_mismatch_blocks_without_value() {
    let harness = TestHarness::setup();
    harness.respond(200, r#"{"code":4001,"message":"IMEI belongs to another brand"}"#);

    let decision = harness.assess(&TestHarness::pro_max_request(true)).await;

    assert_eq!(decision.value(), None);
    assert_eq!(decision.block_reason(), Some(&BlockReason::Mismatch));
    assert_eq!(
        decision.verification().map(|v| v.status),
        Some(VerificationStatus::Mismatch)
    );
    assert!(!decision.explanation().contains("800"));
}

#[tokio::test]
async fn test_ineligible_blocks_with_upstream_message() {
    let harness = TestHarness::setup();
    harness.respond(200, r#"{"code":4020,"msg":"device reported lost"}"#);

    let decision = harness.assess(&TestHarness::pro_max_request(true)).await;

    assert_eq!(decision.value(), None);
    assert_eq!(decision.block_reason(), Some(&BlockReason::Ineligible));
    assert!(decision.explanation().contains("device reported lost"));
}

#[tokio::test]
async fn test_missing_session_token_is_soft_block_with_portal() {
    let harness = TestHarness::setup();
    harness.respond(400, r#"{"error":"session required"}"#);

    let decision = harness.assess(&TestHarness::pro_max_request(true)).await;

    assert_eq!(decision.value(), None);
    assert_eq!(
        decision.block_reason(),
        Some(&BlockReason::Unverifiable {
            cause: UnverifiableReason::SessionTokenMissing
        })
    );
    let next = decision.next_action().expect("next action");
    assert!(next.contains(PORTAL_URL));
}

#[tokio::test]
async fn test_transport_failure_is_unverifiable() {
    let harness = TestHarness::setup();
    harness.fail_transport(TransportError::Request("connection reset".to_string()));

    let decision = harness.assess(&TestHarness::pro_max_request(true)).await;

    assert_eq!(
        decision.block_reason(),
        Some(&BlockReason::Unverifiable {
            cause: UnverifiableReason::Transport
        })
    );
}

#[tokio::test]
async fn test_array_body_is_not_a_verification() {
    let harness = TestHarness::setup();

    for body in ["[]", "[null]", "[1000]", "null"] {
        harness.respond(200, body);
        let decision = harness.assess(&TestHarness::pro_max_request(true)).await;

        assert_eq!(decision.value(), None, "body {body}");
        assert_eq!(
            decision.block_reason(),
            Some(&BlockReason::Unverifiable {
                cause: UnverifiableReason::MalformedResponse
            })
        );
    }
}

#[tokio::test]
async fn test_format_and_checksum_errors_stop_before_catalog() {
    let harness = TestHarness::setup();

    let short = harness
        .assess(&TradeInRequest::new("12345", "Apple", "iPhone 15 Pro Max"))
        .await;
    assert_eq!(
        short.block_reason(),
        Some(&BlockReason::InvalidFormat {
            error: ImeiError::WrongLength { digits: 5 }
        })
    );

    let letters = harness
        .assess(&TradeInRequest::new("1234-ABCD-5678-90", "Apple", "iPhone 15 Pro Max"))
        .await;
    assert!(matches!(
        letters.block_reason(),
        Some(BlockReason::InvalidFormat { .. })
    ));

    let checksum = harness
        .assess(&TradeInRequest::new("490154203237519", "Apple", "iPhone 15 Pro Max"))
        .await;
    assert_eq!(checksum.block_reason(), Some(&BlockReason::ChecksumFailed));

    assert_eq!(harness.catalog.calls(), 0);
    assert_eq!(harness.gateway.calls(), 0);
}

#[tokio::test]
async fn test_brand_miss_offers_brands() {
    let harness = TestHarness::setup();

    let decision = harness
        .assess(&TradeInRequest::new(VALID_IMEI, "Nokia", "3310"))
        .await;

    assert_eq!(
        decision.block_reason(),
        Some(&BlockReason::CatalogMiss {
            level: MissLevel::Brand,
            query: "Nokia".to_string(),
            alternatives: vec!["Apple".to_string(), "Samsung".to_string()],
        })
    );
    assert!(decision
        .next_action()
        .is_some_and(|a| a.contains("Apple, Samsung")));
    assert_eq!(harness.gateway.calls(), 0);
}

#[tokio::test]
async fn test_catalog_fetched_once_within_window() {
    let harness = TestHarness::setup();

    harness.assess(&TestHarness::pro_max_request(true)).await;
    harness.clock.advance(Duration::from_secs(60));
    harness.assess(&TestHarness::pro_max_request(true)).await;
    assert_eq!(harness.catalog.calls(), 1);

    harness.clock.advance(FRESHNESS);
    harness.assess(&TestHarness::pro_max_request(true)).await;
    assert_eq!(harness.catalog.calls(), 2);
}

#[tokio::test]
async fn test_catalog_outage_serves_stale_snapshot() {
    let harness = TestHarness::setup();
    assert_eq!(harness.assess(&TestHarness::pro_max_request(true)).await.value(), Some(800));

    harness.catalog.set_failing(true);
    harness.clock.advance(FRESHNESS * 3);
    let decision = harness.assess(&TestHarness::pro_max_request(true)).await;

    assert_eq!(decision.value(), Some(800));
    assert_eq!(harness.catalog.calls(), 2);
    assert_eq!(harness.gate.catalog().stats().stale_serves, 1);
}

#[tokio::test]
async fn test_catalog_outage_without_snapshot() {
    let harness = TestHarness::setup();
    harness.catalog.set_failing(true);

    let decision = harness.assess(&TestHarness::pro_max_request(true)).await;

    assert!(matches!(
        decision.block_reason(),
        Some(BlockReason::UpstreamUnavailable { .. })
    ));
    assert_eq!(harness.gateway.calls(), 0);
}

#[tokio::test]
async fn test_decision_json_shape() {
    let harness = TestHarness::setup();

    let decision = harness.assess(&TestHarness::pro_max_request(true)).await;
    let json: serde_json::Value = serde_json::to_value(&decision).expect("serializes");

    assert_eq!(json["verdict"]["status"], "disclosed");
    assert_eq!(json["verdict"]["amount"], 800);
    assert_eq!(json["identifier"], "***********7518");
    assert!(!json.to_string().contains(VALID_IMEI));
}
