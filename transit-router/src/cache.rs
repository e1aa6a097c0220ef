//! Caching layer for station distance queries.
//!
//! A distance query runs a full search over the network. The network never
//! changes while the server runs, so results only depend on the query
//! parameters and can be kept until they age out.

use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache as MokaCache;
use tracing::debug;

use crate::domain::{ClockTime, StationId};
use crate::planner::SearchError;

/// Cache key for distance rows: (source station, start time, transfer minutes).
pub type DistanceKey = (StationId, ClockTime, i64);

/// Cached distance row: minutes to each reachable station.
pub type DistanceEntry = Arc<BTreeMap<StationId, u32>>;

/// Configuration for the cache.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// TTL for cached entries.
    pub ttl: Duration,

    /// Maximum number of cached entries.
    pub max_capacity: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(10 * 60),
            max_capacity: 1000,
        }
    }
}

/// Cache for distance rows.
pub struct DistanceCache {
    rows: MokaCache<DistanceKey, DistanceEntry>,
}

impl DistanceCache {
    /// Create a new cache with the given configuration.
    pub fn new(config: &CacheConfig) -> Self {
        let rows = MokaCache::builder()
            .time_to_live(config.ttl)
            .max_capacity(config.max_capacity)
            .build();

        Self { rows }
    }

    pub async fn get(&self, key: &DistanceKey) -> Option<DistanceEntry> {
        self.rows.get(key).await
    }

    pub async fn insert(&self, key: DistanceKey, entry: DistanceEntry) {
        self.rows.insert(key, entry).await;
    }

    /// Returns the cached row for `key`, computing and caching it on a miss.
    ///
    /// Failed computations are not cached.
    pub async fn get_or_compute<F, Fut>(
        &self,
        key: DistanceKey,
        compute: F,
    ) -> Result<DistanceEntry, SearchError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<BTreeMap<StationId, u32>, SearchError>>,
    {
        if let Some(cached) = self.get(&key).await {
            debug!(from = %key.0, start = %key.1, "Distance cache hit");
            return Ok(cached);
        }

        let entry = Arc::new(compute().await?);
        self.insert(key, entry.clone()).await;

        Ok(entry)
    }

    /// Approximate number of entries (for monitoring).
    pub fn entry_count(&self) -> u64 {
        self.rows.entry_count()
    }

    /// Invalidate all cached entries.
    pub fn invalidate_all(&self) {
        self.rows.invalidate_all();
    }
}
