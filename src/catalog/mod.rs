//! Trade-in catalog: decoding, fetching, and TTL caching.
//!
//! # Architecture
//!
//! ```text
//! get()
//!   │
//!   ▼
//! ┌──────────────────────┐
//! │ Snapshot fresh?      │
//! └─────────┬────────────┘
//!           │
//!    ┌──────┴──────┐
//!    │             │
//!   YES            NO
//!    │             │
//!    ▼             ▼
//! Return      Fetch from source
//!                  │
//!           ┌──────┴──────┐
//!           │             │
//!          OK           FAILED
//!           │             │
//!           ▼             ▼
//!    Replace + return   Previous snapshot?
//!                         yes → serve stale
//!                         no  → UpstreamUnavailable
//! ```

mod cache;
mod clock;
mod model;
mod source;

pub use cache::{CacheStats, CatalogCache, CatalogSnapshot, DEFAULT_FRESHNESS};
pub use clock::{Clock, SystemClock};
pub use model::{Brand, Model, TradeInCatalog, Variant};
pub use source::{CatalogSource, HttpCatalogSource};
