//! Local IMEI validation: separator stripping, length, and Luhn checksum.
//!
//! Everything here is pure. No network access happens until an identifier
//! has passed [`validate`].

use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Number of digits in an IMEI.
pub const IMEI_LENGTH: usize = 15;

/// Characters removed before validation (besides whitespace).
const SEPARATORS: [char; 4] = ['-', '(', ')', '.'];

/// Why an identifier was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ImeiError {
    /// Wrong number of characters after stripping separators.
    #[error("IMEI must be exactly 15 digits, but {digits} digits were found")]
    WrongLength {
        /// Digits observed in the cleaned input.
        digits: usize,
    },

    /// Non-digit characters remain after stripping separators.
    #[error("IMEI must contain only digits")]
    NonDigit,

    /// Well-formed, but the check digit is wrong.
    #[error("IMEI failed checksum validation")]
    Checksum,
}

impl ImeiError {
    /// Returns true for length/character failures, false for checksum failures.
    #[must_use]
    pub fn is_format_error(&self) -> bool {
        matches!(self, Self::WrongLength { .. } | Self::NonDigit)
    }
}

/// Structural result of validating a raw identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImeiCheck {
    /// Identifier passed every check.
    pub is_valid: bool,
    /// Input with separators removed.
    pub cleaned: String,
    /// Luhn checksum passed. False whenever a format check failed first.
    pub checksum_passed: bool,
    /// Human-readable summary.
    pub message: String,
    /// Failure kind, if any.
    pub failure: Option<ImeiError>,
}

/// A validated 15-digit device identifier.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct DeviceIdentifier(String);

impl DeviceIdentifier {
    /// Validate `raw` and wrap the cleaned digits.
    ///
    /// # Errors
    ///
    /// Returns the first failed check.
    pub fn parse(raw: &str) -> Result<Self, ImeiError> {
        let check = validate(raw);
        match check.failure {
            None => Ok(Self(check.cleaned)),
            Some(err) => Err(err),
        }
    }

    /// The 15 digits.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Rendering safe for logs: only the last four digits are kept.
    #[must_use]
    pub fn masked(&self) -> String {
        let tail = &self.0[IMEI_LENGTH - 4..];
        format!("{}{tail}", "*".repeat(IMEI_LENGTH - 4))
    }
}

impl fmt::Debug for DeviceIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("DeviceIdentifier").field(&self.masked()).finish()
    }
}

impl fmt::Display for DeviceIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.masked())
    }
}

/// Remove whitespace and the common separators people type into IMEIs.
#[must_use]
pub fn clean(raw: &str) -> String {
    raw.chars()
        .filter(|c| !c.is_whitespace() && !SEPARATORS.contains(c))
        .collect()
}

/// Luhn check over a string of ASCII digits.
///
/// Digits at odd (0-indexed) positions are doubled, minus 9 when above 9.
/// Non-digit input never passes.
#[must_use]
pub fn luhn_checksum_passes(digits: &str) -> bool {
    let mut sum = 0u32;
    for (index, c) in digits.chars().enumerate() {
        let Some(mut digit) = c.to_digit(10) else {
            return false;
        };
        if index % 2 == 1 {
            digit *= 2;
            if digit > 9 {
                digit -= 9;
            }
        }
        sum += digit;
    }
    sum % 10 == 0
}

/// Validate a raw identifier as typed by a customer.
#[must_use]
pub fn validate(raw: &str) -> ImeiCheck {
    let cleaned = clean(raw);

    let failure = if cleaned.chars().count() != IMEI_LENGTH {
        let digits = cleaned.chars().filter(char::is_ascii_digit).count();
        Some(ImeiError::WrongLength { digits })
    } else if !cleaned.chars().all(|c| c.is_ascii_digit()) {
        Some(ImeiError::NonDigit)
    } else if !luhn_checksum_passes(&cleaned) {
        Some(ImeiError::Checksum)
    } else {
        None
    };

    match failure {
        None => ImeiCheck {
            is_valid: true,
            cleaned,
            checksum_passed: true,
            message: "IMEI format is valid".to_string(),
            failure: None,
        },
        Some(err) => ImeiCheck {
            is_valid: false,
            cleaned,
            checksum_passed: false,
            message: err.to_string(),
            failure: Some(err),
        },
    }
}
