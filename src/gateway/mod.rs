//! Verification gateway: transport, response normalization, outcome table.

mod client;
mod outcome;
mod transport;

pub use client::{interpret, VerificationClient, VerificationClientConfig, DEFAULT_GATEWAY_TIMEOUT};
pub use outcome::{
    classify_code, CodeClass, UnverifiableReason, VerificationOutcome, VerificationStatus,
    INELIGIBLE_CODES, MISMATCH_CODE, SUCCESS_CODES,
};
pub use transport::{
    GatewayResponse, GatewayTransport, HttpGatewayTransport, TransportError, VerificationQuery,
};
