//! Application state for the web layer.

use std::sync::Arc;

use crate::cache::{CacheConfig, DistanceCache};
use crate::network::TransitNetwork;
use crate::planner::SearchConfig;

/// Shared application state.
///
/// Contains all the services needed to handle requests.
#[derive(Clone)]
pub struct AppState {
    /// The read-only transit network
    pub network: Arc<TransitNetwork>,

    /// Default search parameters
    pub config: Arc<SearchConfig>,

    /// Cached distance rows
    pub distances: Arc<DistanceCache>,
}

impl AppState {
    /// Create a new app state.
    pub fn new(network: TransitNetwork, config: SearchConfig, cache_config: &CacheConfig) -> Self {
        Self {
            network: Arc::new(network),
            config: Arc::new(config),
            distances: Arc::new(DistanceCache::new(cache_config)),
        }
    }
}
