//! End-to-end tests for the trade-in gate.
//!
//! Every test drives [`tradein_gate::TradeInGate::assess`] against stub
//! collaborators from [`harness`]: an in-memory catalog source with a call
//! counter, a scripted verification gateway, and a manual clock.
//!
//! ```bash
//! cargo test --test e2e
//! ```

mod disclosure_property;
mod harness;
mod trade_in_flows;

pub use harness::{TestHarness, FRESHNESS, PORTAL_URL, VALID_IMEI};
