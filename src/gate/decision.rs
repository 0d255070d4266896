//! Trade-in decisions and the disclosure rule.
//!
//! A [`DisclosedValue`] can only be built from a [`VerificationOutcome`]
//! whose status is exactly `Verified`, and [`TradeInDecision`] has no public
//! constructor. A decision carrying money therefore always carries the
//! verified outcome that allowed it.

use crate::catalog::Variant;
use crate::gateway::{UnverifiableReason, VerificationOutcome, VerificationStatus};
use crate::imei::{DeviceIdentifier, ImeiError};
use crate::resolver::ResolvedDevice;
use serde::Serialize;

/// Multiplier applied to the base price for a device not in good condition.
pub const POOR_CONDITION_MULTIPLIER: f64 = 0.5;

/// Declared device condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Condition {
    /// Full value.
    Good,
    /// Half value.
    Poor,
}

impl Condition {
    /// Price multiplier for this condition.
    #[must_use]
    pub fn multiplier(self) -> f64 {
        match self {
            Self::Good => 1.0,
            Self::Poor => POOR_CONDITION_MULTIPLIER,
        }
    }

    /// Map the request flag. A missing flag means good.
    #[must_use]
    pub fn from_flag(condition_good: Option<bool>) -> Self {
        if condition_good.unwrap_or(true) {
            Self::Good
        } else {
            Self::Poor
        }
    }
}

/// A trade-in value cleared for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisclosedValue {
    amount: u64,
    base_price: f64,
    condition: Condition,
    variants: Vec<Variant>,
}

impl DisclosedValue {
    /// Price the device, but only for a verified outcome.
    #[must_use]
    pub fn for_verified(
        device: &ResolvedDevice,
        condition: Condition,
        outcome: &VerificationOutcome,
    ) -> Option<Self> {
        if !outcome.is_verified() {
            return None;
        }
        let base_price = device.price();
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let amount = (base_price * condition.multiplier()).round().max(0.0) as u64;
        Some(Self {
            amount,
            base_price,
            condition,
            variants: device.variants.clone(),
        })
    }

    /// Trade-in amount in whole currency units, condition applied.
    #[must_use]
    pub fn amount(&self) -> u64 {
        self.amount
    }

    /// Catalog price before the condition multiplier.
    #[must_use]
    pub fn base_price(&self) -> f64 {
        self.base_price
    }

    /// Condition the amount was computed for.
    #[must_use]
    pub fn condition(&self) -> Condition {
        self.condition
    }

    /// All capacity variants of the model at base price.
    #[must_use]
    pub fn variants(&self) -> &[Variant] {
        &self.variants
    }
}

/// Catalog level at which resolution failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MissLevel {
    /// No brand matched.
    Brand,
    /// The brand matched, no model did.
    Model,
}

/// Why no value was disclosed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum BlockReason {
    /// Wrong length or non-digit characters.
    InvalidFormat {
        /// The format failure.
        error: ImeiError,
    },
    /// Well-formed identifier with a bad check digit.
    ChecksumFailed,
    /// Brand or model not in the trade-in catalog.
    CatalogMiss {
        /// Level that failed.
        level: MissLevel,
        /// What the caller asked for.
        query: String,
        /// Valid names at that level.
        alternatives: Vec<String>,
    },
    /// Catalog could not be fetched and nothing was cached.
    UpstreamUnavailable {
        /// Failure detail.
        detail: String,
    },
    /// The gateway says the IMEI belongs to another device.
    Mismatch,
    /// The gateway says the device is blocked.
    Ineligible,
    /// No confirmed answer from the gateway.
    Unverifiable {
        /// Why.
        cause: UnverifiableReason,
    },
}

impl BlockReason {
    /// Hard blocks are confirmed negatives; soft blocks may clear out of band.
    #[must_use]
    pub fn is_hard_block(&self) -> bool {
        matches!(self, Self::Mismatch | Self::Ineligible)
    }
}

/// Disclosed or blocked.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Verdict {
    /// Value may be shown.
    Disclosed(DisclosedValue),
    /// Value must not be shown.
    Blocked(BlockReason),
}

/// The device as matched, without prices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceSummary {
    /// Canonical brand.
    pub brand: String,
    /// Canonical model.
    pub model: String,
    /// Selected capacity.
    pub capacity: String,
    /// Provider model code.
    pub model_code: String,
}

impl From<&ResolvedDevice> for DeviceSummary {
    fn from(device: &ResolvedDevice) -> Self {
        Self {
            brand: device.brand.clone(),
            model: device.model.clone(),
            capacity: device.variant.capacity.clone(),
            model_code: device.variant.model_code.clone(),
        }
    }
}

impl DeviceSummary {
    fn label(&self) -> String {
        format!("{} {} ({})", self.brand, self.model, self.capacity)
    }
}

/// Final output of the gate. Always present, never an error.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TradeInDecision {
    /// Masked identifier, once it passed validation.
    identifier: Option<String>,
    /// Matched device, once resolution succeeded.
    device: Option<DeviceSummary>,
    /// Gateway outcome, once the gateway was called.
    verification: Option<VerificationOutcome>,
    /// Disclosed value or block reason.
    verdict: Verdict,
    /// Human-readable explanation.
    explanation: String,
    /// What the customer should do next.
    next_action: Option<String>,
}

impl TradeInDecision {
    /// Trade-in amount, present only when verified.
    #[must_use]
    pub fn value(&self) -> Option<u64> {
        match &self.verdict {
            Verdict::Disclosed(value) => Some(value.amount()),
            Verdict::Blocked(_) => None,
        }
    }

    /// Disclosed value details.
    #[must_use]
    pub fn disclosed(&self) -> Option<&DisclosedValue> {
        match &self.verdict {
            Verdict::Disclosed(value) => Some(value),
            Verdict::Blocked(_) => None,
        }
    }

    /// Block reason, if blocked.
    #[must_use]
    pub fn block_reason(&self) -> Option<&BlockReason> {
        match &self.verdict {
            Verdict::Disclosed(_) => None,
            Verdict::Blocked(reason) => Some(reason),
        }
    }

    /// Disclosed or blocked.
    #[must_use]
    pub fn verdict(&self) -> &Verdict {
        &self.verdict
    }

    /// Gateway outcome, if the gateway was reached.
    #[must_use]
    pub fn verification(&self) -> Option<&VerificationOutcome> {
        self.verification.as_ref()
    }

    /// Matched device, if resolution succeeded.
    #[must_use]
    pub fn device(&self) -> Option<&DeviceSummary> {
        self.device.as_ref()
    }

    /// Masked identifier.
    #[must_use]
    pub fn identifier(&self) -> Option<&str> {
        self.identifier.as_deref()
    }

    /// Human-readable explanation.
    #[must_use]
    pub fn explanation(&self) -> &str {
        &self.explanation
    }

    /// Suggested next step.
    #[must_use]
    pub fn next_action(&self) -> Option<&str> {
        self.next_action.as_deref()
    }

    /// Short status label for logs.
    #[must_use]
    pub fn status_label(&self) -> &'static str {
        match &self.verdict {
            Verdict::Disclosed(_) => "disclosed",
            Verdict::Blocked(BlockReason::InvalidFormat { .. }) => "blocked_invalid_format",
            Verdict::Blocked(BlockReason::ChecksumFailed) => "blocked_checksum",
            Verdict::Blocked(BlockReason::CatalogMiss { .. }) => "blocked_catalog_miss",
            Verdict::Blocked(BlockReason::UpstreamUnavailable { .. }) => "blocked_upstream",
            Verdict::Blocked(BlockReason::Mismatch) => "blocked_mismatch",
            Verdict::Blocked(BlockReason::Ineligible) => "blocked_ineligible",
            Verdict::Blocked(BlockReason::Unverifiable { .. }) => "blocked_unverifiable",
        }
    }

    /// Identifier failed local validation.
    pub(crate) fn invalid_identifier(error: ImeiError) -> Self {
        let (reason, explanation, next_action) = if error.is_format_error() {
            (
                BlockReason::InvalidFormat { error },
                format!("{error}."),
                concat!(
                    "Dial *#06# on the device, or open Settings > About, ",
                    "to find the 15-digit IMEI and enter it again."
                ),
            )
        } else {
            (
                BlockReason::ChecksumFailed,
                "The IMEI failed checksum validation, so it was probably mistyped.".to_string(),
                "Re-enter the IMEI exactly as shown after dialing *#06#.",
            )
        };
        Self::blocked(None, reason, explanation, Some(next_action.to_string()))
    }

    /// Catalog could not be loaded.
    pub(crate) fn upstream_unavailable(identifier: &DeviceIdentifier, detail: String) -> Self {
        Self::blocked(
            Some(identifier),
            BlockReason::UpstreamUnavailable { detail },
            "Trade-in pricing is temporarily unavailable.".to_string(),
            Some("Please try again in a few minutes.".to_string()),
        )
    }

    /// Brand or model not found.
    pub(crate) fn catalog_miss(
        identifier: &DeviceIdentifier,
        level: MissLevel,
        query: String,
        alternatives: Vec<String>,
    ) -> Self {
        let explanation = match level {
            MissLevel::Brand => format!("We don't offer trade-ins for the brand \"{query}\"."),
            MissLevel::Model => {
                format!("We couldn't find the model \"{query}\" in our trade-in catalog.")
            }
        };
        let next_action = if alternatives.is_empty() {
            None
        } else {
            Some(format!("Choose one of: {}.", alternatives.join(", ")))
        };
        Self::blocked(
            Some(identifier),
            BlockReason::CatalogMiss {
                level,
                query,
                alternatives,
            },
            explanation,
            next_action,
        )
    }

    /// Map a gateway outcome to the final decision. The only path to a
    /// disclosed value.
    pub(crate) fn from_verification(
        identifier: &DeviceIdentifier,
        device: &ResolvedDevice,
        condition: Condition,
        outcome: VerificationOutcome,
        portal_url: &str,
    ) -> Self {
        let summary = DeviceSummary::from(device);
        let label = summary.label();

        let status = outcome.status;
        let (reason, explanation, next_action) = match status {
            VerificationStatus::Verified => {
                if let Some(value) = DisclosedValue::for_verified(device, condition, &outcome) {
                    let explanation = match condition {
                        Condition::Good => format!(
                            "Your {label} is verified. Its trade-in value is {}.",
                            value.amount()
                        ),
                        Condition::Poor => format!(
                            "Your {label} is verified. Its trade-in value is {} \
                             after the condition adjustment.",
                            value.amount()
                        ),
                    };
                    return Self {
                        identifier: Some(identifier.masked()),
                        device: Some(summary),
                        verification: Some(outcome),
                        verdict: Verdict::Disclosed(value),
                        explanation,
                        next_action: None,
                    };
                }
                // for_verified only refuses non-verified outcomes.
                (
                    BlockReason::Unverifiable {
                        cause: UnverifiableReason::UnknownCode,
                    },
                    format!("We could not verify your {label} automatically."),
                    Some(format!("Verify the device at {portal_url} to see its trade-in value.")),
                )
            }
            VerificationStatus::Mismatch => (
                BlockReason::Mismatch,
                format!(
                    "The IMEI you entered does not belong to a {} {}.",
                    summary.brand, summary.model
                ),
                Some(
                    "Check that the brand and model match the device the IMEI came from."
                        .to_string(),
                ),
            ),
            VerificationStatus::DeviceIneligible => (
                BlockReason::Ineligible,
                match outcome.message.as_deref() {
                    Some(message) => {
                        format!("This device is not eligible for trade-in: {message}.")
                    }
                    None => "This device is not eligible for trade-in.".to_string(),
                },
                Some("Contact support if you believe this is an error.".to_string()),
            ),
            VerificationStatus::Unverifiable(cause) => (
                BlockReason::Unverifiable { cause },
                format!("We could not verify your {label} automatically: {cause}."),
                Some(if cause == UnverifiableReason::SessionTokenMissing {
                    format!(
                        "Sign in and verify the device at {portal_url} to see its trade-in value."
                    )
                } else {
                    format!("Verify the device at {portal_url} to see its trade-in value.")
                }),
            ),
        };

        Self {
            identifier: Some(identifier.masked()),
            device: Some(summary),
            verification: Some(outcome),
            verdict: Verdict::Blocked(reason),
            explanation,
            next_action,
        }
    }

    fn blocked(
        identifier: Option<&DeviceIdentifier>,
        reason: BlockReason,
        explanation: String,
        next_action: Option<String>,
    ) -> Self {
        Self {
            identifier: identifier.map(DeviceIdentifier::masked),
            device: None,
            verification: None,
            verdict: Verdict::Blocked(reason),
            explanation,
            next_action,
        }
    }
}
