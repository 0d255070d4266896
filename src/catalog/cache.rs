//! TTL cache for the trade-in catalog with stale-serving on refresh failure.
//!
//! The snapshot is swapped as a whole behind an `Arc`, so a reader either
//! sees the previous catalog or the new one. Concurrent callers that find
//! the snapshot expired may both fetch; the fetch is a read-only GET and
//! the last writer wins.

use super::clock::{Clock, SystemClock};
use super::model::TradeInCatalog;
use super::source::CatalogSource;
use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use parking_lot::{Mutex, RwLock};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Default freshness window (15 minutes).
pub const DEFAULT_FRESHNESS: Duration = Duration::from_secs(15 * 60);

/// An immutable catalog plus the time it was fetched.
#[derive(Debug)]
pub struct CatalogSnapshot {
    catalog: TradeInCatalog,
    fetched_at: Instant,
    fetched_at_utc: DateTime<Utc>,
}

impl CatalogSnapshot {
    fn new(catalog: TradeInCatalog, fetched_at: Instant) -> Self {
        Self {
            catalog,
            fetched_at,
            fetched_at_utc: Utc::now(),
        }
    }

    /// The catalog.
    #[must_use]
    pub fn catalog(&self) -> &TradeInCatalog {
        &self.catalog
    }

    /// Wall-clock time of the fetch, for diagnostics.
    #[must_use]
    pub fn fetched_at_utc(&self) -> DateTime<Utc> {
        self.fetched_at_utc
    }

    /// Age of the snapshot relative to `now`.
    #[must_use]
    pub fn age(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.fetched_at)
    }
}

/// Cache statistics for monitoring.
#[derive(Debug, Default, Clone)]
pub struct CacheStats {
    /// Calls answered from a fresh snapshot.
    pub hits: u64,
    /// Successful upstream fetches.
    pub refreshes: u64,
    /// Failed fetches answered with the previous snapshot.
    pub stale_serves: u64,
    /// Failed upstream fetches.
    pub failures: u64,
}

impl CacheStats {
    /// Fresh hits as a percentage of all calls.
    #[must_use]
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.refreshes + self.failures;
        if total == 0 {
            0.0
        } else {
            (self.hits as f64 / total as f64) * 100.0
        }
    }
}

/// Process-wide trade-in catalog cache.
///
/// Cloning is cheap and clones share the same snapshot.
#[derive(Clone)]
pub struct CatalogCache {
    source: Arc<dyn CatalogSource>,
    clock: Arc<dyn Clock>,
    freshness: Duration,
    slot: Arc<RwLock<Option<Arc<CatalogSnapshot>>>>,
    stats: Arc<Mutex<CacheStats>>,
}

impl CatalogCache {
    /// Create a cache over `source` using the system clock.
    #[must_use]
    pub fn new(source: Arc<dyn CatalogSource>, freshness: Duration) -> Self {
        Self::with_clock(source, freshness, Arc::new(SystemClock))
    }

    /// Create a cache with an explicit clock.
    #[must_use]
    pub fn with_clock(
        source: Arc<dyn CatalogSource>,
        freshness: Duration,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            source,
            clock,
            freshness,
            slot: Arc::new(RwLock::new(None)),
            stats: Arc::new(Mutex::new(CacheStats::default())),
        }
    }

    /// Return the cached catalog, fetching it first if missing or expired.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UpstreamUnavailable`] only when the fetch fails and
    /// there is no previous snapshot to serve.
    pub async fn get(&self) -> Result<Arc<CatalogSnapshot>> {
        if let Some(snapshot) = self.current() {
            let age = snapshot.age(self.clock.now());
            if age < self.freshness {
                self.stats.lock().hits += 1;
                return Ok(snapshot);
            }
            debug!("Catalog snapshot is {}s old, revalidating", age.as_secs());
        }

        self.refresh().await
    }

    /// Fetch from upstream regardless of snapshot age.
    ///
    /// # Errors
    ///
    /// Same as [`CatalogCache::get`].
    pub async fn force_refresh(&self) -> Result<Arc<CatalogSnapshot>> {
        self.refresh().await
    }

    /// The current snapshot without touching upstream.
    #[must_use]
    pub fn current(&self) -> Option<Arc<CatalogSnapshot>> {
        self.slot.read().clone()
    }

    /// Get current cache statistics.
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        self.stats.lock().clone()
    }

    /// Configured freshness window.
    #[must_use]
    pub fn freshness(&self) -> Duration {
        self.freshness
    }

    async fn refresh(&self) -> Result<Arc<CatalogSnapshot>> {
        let fetched = self.source.fetch().await.and_then(|catalog| {
            if catalog.is_empty() {
                Err(Error::Decode("catalog has no phone brands".to_string()))
            } else {
                Ok(catalog)
            }
        });

        match fetched {
            Ok(catalog) => {
                let snapshot = Arc::new(CatalogSnapshot::new(catalog, self.clock.now()));
                *self.slot.write() = Some(Arc::clone(&snapshot));
                self.stats.lock().refreshes += 1;
                info!(
                    "Trade-in catalog refreshed ({} brands, {} models)",
                    snapshot.catalog().brands().len(),
                    snapshot.catalog().model_count()
                );
                Ok(snapshot)
            }
            Err(e) => {
                let previous = self.current();
                let mut stats = self.stats.lock();
                stats.failures += 1;
                if let Some(snapshot) = previous {
                    stats.stale_serves += 1;
                    warn!(
                        "Catalog refresh failed, serving snapshot from {}: {e}",
                        snapshot.fetched_at_utc()
                    );
                    Ok(snapshot)
                } else {
                    warn!("Catalog refresh failed with no snapshot to serve: {e}");
                    Err(Error::UpstreamUnavailable(e.to_string()))
                }
            }
        }
    }
}
