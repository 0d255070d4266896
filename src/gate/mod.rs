//! Trade-in gate: validation, resolution, verification, disclosure.
//!
//! # Flow
//!
//! ```text
//! assess(request)
//!     │
//!     ▼
//! ┌──────────────────┐  invalid
//! │ Validate IMEI    │──────────▶ blocked (format / checksum)
//! └────────┬─────────┘
//!          ▼
//! ┌──────────────────┐  no catalog
//! │ Load catalog     │──────────▶ blocked (upstream unavailable)
//! └────────┬─────────┘
//!          ▼
//! ┌──────────────────┐  no match
//! │ Resolve device   │──────────▶ blocked (catalog miss + alternatives)
//! └────────┬─────────┘
//!          ▼
//! ┌──────────────────┐  mismatch / ineligible / unverifiable
//! │ Verify with      │──────────▶ blocked (no value)
//! │ gateway          │
//! └────────┬─────────┘
//!          │ verified
//!          ▼
//!   value disclosed
//! ```
//!
//! Each stage runs once; nothing is retried.

mod decision;
mod orchestrator;

pub use decision::{
    BlockReason, Condition, DeviceSummary, DisclosedValue, MissLevel, TradeInDecision, Verdict,
    POOR_CONDITION_MULTIPLIER,
};
pub use orchestrator::{TradeInGate, TradeInRequest};
