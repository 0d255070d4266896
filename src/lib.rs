//! # tradein-gate
//!
//! Trade-in IMEI verification pipeline for the shopping-assistant backend.
//!
//! A trade-in request flows through four stages before any money is shown
//! to the customer:
//!
//! ```text
//! identifier ──▶ imei::validate ──▶ catalog + resolver ──▶ gateway::verify
//!                     │                    │                     │
//!                 format/checksum      catalog miss       mismatch / ineligible
//!                     ▼                    ▼               / unverifiable
//!                  blocked              blocked                 ▼
//!                                                            blocked
//!                                        Verified ──▶ value disclosed
//! ```
//!
//! The entry point is [`TradeInGate::assess`], which always returns a
//! [`TradeInDecision`]. A monetary value is present in the decision only
//! when the verification gateway returned
//! [`gateway::VerificationStatus::Verified`].

pub mod catalog;
pub mod config;
pub mod error;
pub mod gate;
pub mod gateway;
pub mod imei;
pub mod resolver;

pub use catalog::{CatalogCache, CatalogSnapshot, HttpCatalogSource, TradeInCatalog};
pub use config::GateConfig;
pub use error::{Error, Result};
pub use gate::{TradeInDecision, TradeInGate, TradeInRequest};
pub use gateway::{VerificationClient, VerificationOutcome};
pub use imei::{DeviceIdentifier, ImeiCheck};
pub use resolver::{resolve, Resolution, ResolvedDevice};
