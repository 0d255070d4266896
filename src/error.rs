//! Error types for tradein-gate.

use thiserror::Error;

/// Result type alias using the crate error.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the configuration loader and the catalog layer.
///
/// Verification and gating never return these: the gate folds every
/// failure into a [`crate::gate::TradeInDecision`].
#[derive(Debug, Error)]
pub enum Error {
    /// Filesystem error while reading or writing configuration.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration could not be parsed or serialized.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Outbound request failed before a usable response arrived.
    #[error("Network error: {0}")]
    Network(String),

    /// Upstream responded but the body could not be decoded.
    #[error("Decode error: {0}")]
    Decode(String),

    /// Catalog refresh failed and no previous snapshot exists.
    #[error("Upstream unavailable: {0}")]
    UpstreamUnavailable(String),
}
