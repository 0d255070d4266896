//! Property tests: a value is disclosed exactly when the device is verified.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use super::TestHarness;
use proptest::prelude::*;
use tradein_gate::gate::TradeInRequest;
use tradein_gate::gateway::{TransportError, VerificationStatus, SUCCESS_CODES};
use tradein_gate::imei::luhn_checksum_passes;

#[derive(Debug, Clone)]
enum Reply {
    Http { status: u16, body: String },
    Failure(TransportError),
}

fn code_strategy() -> impl Strategy<Value = i64> {
    prop_oneof![
        Just(0_i64),
        Just(200),
        Just(1000),
        Just(4001),
        4000_i64..4010,
        4010_i64..5000,
        any::<i64>(),
    ]
}

fn body_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        code_strategy().prop_map(|code| format!(r#"{{"code":{code}}}"#)),
        code_strategy().prop_map(|code| format!(r#"{{"code":"{code}","message":"m"}}"#)),
        Just("{}".to_string()),
        Just(r#"{"message":"no code"}"#.to_string()),
        Just("<html>gateway error</html>".to_string()),
        Just("[]".to_string()),
        Just("[null]".to_string()),
        Just("[1000]".to_string()),
        Just("null".to_string()),
        Just("\"ok\"".to_string()),
        Just(String::new()),
    ]
}

fn reply_strategy() -> impl Strategy<Value = Reply> {
    let status = prop_oneof![
        Just(200_u16),
        Just(400),
        Just(401),
        Just(403),
        Just(500),
        100_u16..600,
    ];
    prop_oneof![
        4 => (status, body_strategy()).prop_map(|(status, body)| Reply::Http { status, body }),
        1 => Just(Reply::Failure(TransportError::Timeout)),
        1 => Just(Reply::Failure(TransportError::Request("reset".to_string()))),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn value_iff_verified(
        reply in reply_strategy(),
        with_token in any::<bool>(),
        condition_good in proptest::option::of(any::<bool>()),
    ) {
        let harness = TestHarness::setup();
        match &reply {
            Reply::Http { status, body } => harness.respond(*status, body),
            Reply::Failure(error) => harness.fail_transport(error.clone()),
        }
        let request = TradeInRequest {
            condition_good,
            session_token: with_token.then(|| "session-abc".to_string()),
            ..TestHarness::pro_max_request(true)
        };

        let decision = tokio_test::block_on(harness.assess(&request));

        let verified = decision
            .verification()
            .is_some_and(|v| v.status == VerificationStatus::Verified);
        prop_assert_eq!(decision.value().is_some(), verified);
        prop_assert_eq!(decision.block_reason().is_none(), verified);

        if let Some(code) = decision.verification().and_then(|v| v.code) {
            if !SUCCESS_CODES.contains(&code) {
                prop_assert!(decision.value().is_none());
            }
        }
        if let Reply::Http { status, body } = &reply {
            if !(200..300).contains(status) || !body.trim_start().starts_with('{') {
                prop_assert!(decision.value().is_none());
            }
        }
        if decision.value().is_none() {
            prop_assert!(!decision.explanation().contains("800"));
        }
    }

    #[test]
    fn checksum_failures_never_reach_gateway(digits in "[0-9]{15}") {
        prop_assume!(!luhn_checksum_passes(&digits));
        let harness = TestHarness::setup();

        let decision = tokio_test::block_on(
            harness.assess(&TradeInRequest::new(digits, "Apple", "iPhone 15 Pro Max")),
        );

        prop_assert!(decision.value().is_none());
        prop_assert_eq!(harness.gateway.calls(), 0);
        prop_assert_eq!(harness.catalog.calls(), 0);
    }
}
