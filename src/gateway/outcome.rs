//! Verification outcomes and the gateway code table.
//!
//! Every numeric code the gateway can return is classified here and
//! nowhere else. Codes not listed fail closed.

use serde::Serialize;
use std::fmt;

/// Code the provider returns when the IMEI does not belong to the claimed
/// device or brand.
pub const MISMATCH_CODE: i64 = 4001;

/// Codes the provider uses for a clean lookup.
pub const SUCCESS_CODES: [i64; 3] = [0, 200, 1000];

/// Blacklisted, stolen-flagged, or otherwise blocked devices.
pub const INELIGIBLE_CODES: std::ops::RangeInclusive<i64> = 4010..=4999;

/// How a gateway outcome code is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CodeClass {
    /// Lookup succeeded with no negative finding.
    Success,
    /// IMEI does not match the claimed device.
    Mismatch,
    /// Device is blocked from trade-in.
    Ineligible,
    /// Not in the table. Includes the rest of 4000..=4009 and codes >= 5000.
    Unknown,
}

/// Classify a gateway outcome code.
#[must_use]
pub fn classify_code(code: i64) -> CodeClass {
    if SUCCESS_CODES.contains(&code) {
        CodeClass::Success
    } else if code == MISMATCH_CODE {
        CodeClass::Mismatch
    } else if INELIGIBLE_CODES.contains(&code) {
        CodeClass::Ineligible
    } else {
        CodeClass::Unknown
    }
}

/// Why a device could not be verified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UnverifiableReason {
    /// No session token was supplied and the gateway needs one.
    SessionTokenMissing,
    /// The call did not finish within the configured timeout.
    Timeout,
    /// Connection or other transport-level failure.
    Transport,
    /// Body was not JSON of the expected shape.
    MalformedResponse,
    /// Non-success HTTP status without an outcome code.
    HttpStatus,
    /// Outcome code is not in the code table.
    UnknownCode,
}

impl UnverifiableReason {
    /// Short human-readable description.
    #[must_use]
    pub fn description(self) -> &'static str {
        match self {
            Self::SessionTokenMissing => {
                "no session token was supplied for the verification service"
            }
            Self::Timeout => "the verification service did not respond in time",
            Self::Transport => "the verification service could not be reached",
            Self::MalformedResponse => "the verification service returned an unreadable response",
            Self::HttpStatus => "the verification service rejected the request",
            Self::UnknownCode => "the verification service returned an unrecognised result",
        }
    }
}

impl fmt::Display for UnverifiableReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

/// The trust state derived from a gateway call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationStatus {
    /// IMEI confirmed for the claimed model.
    Verified,
    /// IMEI belongs to a different device or brand.
    Mismatch,
    /// Device is blocked from trade-in.
    DeviceIneligible,
    /// No confirmed answer either way.
    Unverifiable(UnverifiableReason),
}

/// Result of one gateway call plus raw diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VerificationOutcome {
    /// Normalized trust state.
    pub status: VerificationStatus,
    /// HTTP status, when a response arrived.
    pub http_status: Option<u16>,
    /// Raw outcome code, when one was present and numeric.
    pub code: Option<i64>,
    /// Upstream message or local failure detail.
    pub message: Option<String>,
}

impl VerificationOutcome {
    /// Outcome without a gateway response.
    #[must_use]
    pub fn unverifiable(reason: UnverifiableReason, message: impl Into<String>) -> Self {
        Self {
            status: VerificationStatus::Unverifiable(reason),
            http_status: None,
            code: None,
            message: Some(message.into()),
        }
    }

    /// True only for [`VerificationStatus::Verified`].
    #[must_use]
    pub fn is_verified(&self) -> bool {
        self.status == VerificationStatus::Verified
    }
}
