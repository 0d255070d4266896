//! Verification gateway client: one call, normalized into a trust state.
//!
//! The provider's response shape is not contractually stable. Only an
//! outcome code (`code`) and a message (`message` or `msg`) are read; the
//! rest of the body is ignored. Anything that is not a recognised answer
//! becomes [`VerificationStatus::Unverifiable`], never `Verified`.

use super::outcome::{
    classify_code, CodeClass, UnverifiableReason, VerificationOutcome, VerificationStatus,
};
use super::transport::{GatewayResponse, GatewayTransport, TransportError, VerificationQuery};
use crate::imei::DeviceIdentifier;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Default bound on a single gateway call.
pub const DEFAULT_GATEWAY_TIMEOUT: Duration = Duration::from_secs(10);

/// Configuration for the verification client.
#[derive(Debug, Clone)]
pub struct VerificationClientConfig {
    /// Upper bound on one call, including body read.
    pub timeout: Duration,
    /// Skip the call and report a missing session token when none is given.
    pub require_session_token: bool,
}

impl Default for VerificationClientConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_GATEWAY_TIMEOUT,
            require_session_token: false,
        }
    }
}

/// Client for the external verification gateway.
#[derive(Clone)]
pub struct VerificationClient {
    transport: Arc<dyn GatewayTransport>,
    config: VerificationClientConfig,
}

impl VerificationClient {
    /// Create a client over `transport`.
    #[must_use]
    pub fn new(transport: Arc<dyn GatewayTransport>, config: VerificationClientConfig) -> Self {
        Self { transport, config }
    }

    /// Verify that `identifier` belongs to the device with `model_code`.
    ///
    /// Never fails: transport errors and timeouts become
    /// [`VerificationStatus::Unverifiable`].
    pub async fn verify(
        &self,
        model_code: &str,
        identifier: &DeviceIdentifier,
        session_token: Option<&str>,
        phone_number: Option<&str>,
    ) -> VerificationOutcome {
        let session_token = session_token.map(str::trim).filter(|t| !t.is_empty());

        if session_token.is_none() && self.config.require_session_token {
            debug!("No session token for {identifier}, skipping gateway call");
            return VerificationOutcome::unverifiable(
                UnverifiableReason::SessionTokenMissing,
                "verification requires a signed-in session",
            );
        }

        let query = VerificationQuery {
            model_code,
            imei: identifier.as_str(),
            session_token,
            phone_number,
        };

        let outcome =
            match tokio::time::timeout(self.config.timeout, self.transport.send(&query)).await {
                Ok(Ok(response)) => interpret(&response, session_token.is_some()),
                Ok(Err(TransportError::Timeout)) | Err(_) => VerificationOutcome::unverifiable(
                    UnverifiableReason::Timeout,
                    format!(
                        "no response within {}s",
                        self.config.timeout.as_secs_f32()
                    ),
                ),
                Ok(Err(e)) => {
                    warn!("Verification gateway unreachable: {e}");
                    VerificationOutcome::unverifiable(UnverifiableReason::Transport, e.to_string())
                }
            };

        info!(
            "Gateway verdict for {identifier} on {model_code}: {:?} (http={:?}, code={:?})",
            outcome.status, outcome.http_status, outcome.code
        );
        outcome
    }
}

#[derive(Debug, Deserialize)]
struct GatewayBody {
    #[serde(default)]
    code: Option<LooseCode>,
    #[serde(default, alias = "msg")]
    message: Option<serde_json::Value>,
}

/// Codes arrive as integers, integral floats, or numeric strings.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum LooseCode {
    Int(i64),
    Float(f64),
    Text(String),
}

impl LooseCode {
    #[allow(clippy::cast_possible_truncation)]
    fn value(&self) -> Option<i64> {
        match self {
            Self::Int(n) => Some(*n),
            Self::Float(f) if f.fract() == 0.0 && f.is_finite() => Some(*f as i64),
            Self::Float(_) => None,
            Self::Text(s) => s.trim().parse().ok(),
        }
    }
}

fn message_text(value: Option<serde_json::Value>) -> Option<String> {
    match value? {
        serde_json::Value::Null => None,
        serde_json::Value::String(s) => Some(s),
        other => Some(other.to_string()),
    }
}

/// Decode the body only when it is a JSON object. Arrays and scalars would
/// otherwise fill `GatewayBody` by position.
fn decode_body(body: &str) -> Option<GatewayBody> {
    match serde_json::from_str::<serde_json::Value>(body).ok()? {
        value @ serde_json::Value::Object(_) => serde_json::from_value(value).ok(),
        _ => None,
    }
}

/// Normalize a raw gateway response.
///
/// `token_supplied` separates a missing-session rejection from a generic
/// rejection when the gateway answers 400/401/403 without a code.
#[must_use]
pub fn interpret(response: &GatewayResponse, token_supplied: bool) -> VerificationOutcome {
    let http_status = Some(response.status);

    let Some(body) = decode_body(&response.body) else {
        let reason = if response.is_success() {
            UnverifiableReason::MalformedResponse
        } else {
            rejection_reason(response.status, token_supplied)
        };
        return VerificationOutcome {
            status: VerificationStatus::Unverifiable(reason),
            http_status,
            code: None,
            message: Some(format!("HTTP {}: response is not a JSON object", response.status)),
        };
    };

    let message = message_text(body.message);

    let Some(raw_code) = body.code else {
        let status = if response.is_success() {
            VerificationStatus::Verified
        } else {
            VerificationStatus::Unverifiable(rejection_reason(response.status, token_supplied))
        };
        return VerificationOutcome {
            status,
            http_status,
            code: None,
            message,
        };
    };

    let Some(code) = raw_code.value() else {
        warn!("Gateway returned a non-numeric outcome code: {raw_code:?}");
        return VerificationOutcome {
            status: VerificationStatus::Unverifiable(UnverifiableReason::UnknownCode),
            http_status,
            code: None,
            message,
        };
    };

    let status = match classify_code(code) {
        CodeClass::Mismatch => VerificationStatus::Mismatch,
        CodeClass::Ineligible => VerificationStatus::DeviceIneligible,
        CodeClass::Success if response.is_success() => VerificationStatus::Verified,
        CodeClass::Success => {
            VerificationStatus::Unverifiable(rejection_reason(response.status, token_supplied))
        }
        CodeClass::Unknown => {
            warn!(
                "Unrecognised gateway outcome code {code} (HTTP {}): {}",
                response.status,
                message.as_deref().unwrap_or("no message")
            );
            VerificationStatus::Unverifiable(UnverifiableReason::UnknownCode)
        }
    };

    VerificationOutcome {
        status,
        http_status,
        code: Some(code),
        message,
    }
}

fn rejection_reason(status: u16, token_supplied: bool) -> UnverifiableReason {
    if matches!(status, 400 | 401 | 403) && !token_supplied {
        UnverifiableReason::SessionTokenMissing
    } else {
        UnverifiableReason::HttpStatus
    }
}
