//! Travel-time distances between stations.
//!
//! Each source runs its own search; the network is shared read-only, so the
//! all-pairs table fans searches out over the blocking thread pool.

use std::collections::BTreeMap;
use std::sync::Arc;

use futures::future::join_all;
use tracing::{debug, warn};

use crate::domain::{ClockTime, MINUTES_PER_HOUR, StationId};
use crate::network::TransitNetwork;

use super::cancel::CancelToken;
use super::config::SearchConfig;
use super::search::{Destinations, RouteSearch, SearchError, SearchRequest};

/// Minutes from `from` to every other station reachable within the
/// network's time budget. The source itself is not included.
pub fn station_distances(
    network: &TransitNetwork,
    from: StationId,
    start: ClockTime,
    min_transfer: i64,
    cancel: &CancelToken,
) -> Result<BTreeMap<StationId, u32>, SearchError> {
    let max_duration = i64::from(network.max_time_hours()) * i64::from(MINUTES_PER_HOUR);
    let request = SearchRequest::new(from, Destinations::All, start, min_transfer, max_duration);
    let outcome = RouteSearch::new(network, cancel).run(&request)?;

    Ok(outcome
        .routes
        .iter()
        .filter_map(|(station, route)| route.as_ref().map(|r| (*station, r.elapsed())))
        .collect())
}

/// Distances from every station to every other, for one start time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DistanceTable {
    start: ClockTime,
    rows: BTreeMap<StationId, BTreeMap<StationId, u32>>,
}

impl DistanceTable {
    /// Computes the table with one independent search per source station,
    /// running `config.batch_size` searches at a time.
    ///
    /// The duration budget is the network's `max_time_hours`. Cancelling the
    /// token aborts the whole table.
    pub async fn compute(
        network: Arc<TransitNetwork>,
        start: ClockTime,
        config: &SearchConfig,
        cancel: &CancelToken,
    ) -> Result<Self, SearchError> {
        let sources: Vec<StationId> = network.stations().iter().map(|s| s.id()).collect();
        let min_transfer = config.min_transfer_mins;
        let mut rows = BTreeMap::new();

        for batch in sources.chunks(config.batch_size.max(1)) {
            let tasks: Vec<_> = batch
                .iter()
                .map(|&from| {
                    let network = Arc::clone(&network);
                    let cancel = cancel.clone();
                    tokio::task::spawn_blocking(move || {
                        let row = station_distances(&network, from, start, min_transfer, &cancel);
                        (from, row)
                    })
                })
                .collect();

            for joined in join_all(tasks).await {
                let (from, row) = joined.map_err(|e| {
                    warn!(error = %e, "Distance search task failed");
                    SearchError::Worker(e.to_string())
                })?;
                rows.insert(from, row?);
            }
        }

        debug!(
            sources = rows.len(),
            start = %start,
            min_transfer,
            "Distance table computed"
        );

        Ok(Self { start, rows })
    }

    pub fn start(&self) -> ClockTime {
        self.start
    }

    /// Minutes from `from` to `to`; zero on the diagonal, `None` if unreachable.
    pub fn minutes(&self, from: StationId, to: StationId) -> Option<u32> {
        if from == to {
            return self.rows.contains_key(&from).then_some(0);
        }
        self.rows.get(&from)?.get(&to).copied()
    }

    /// Distances from one station.
    pub fn row(&self, from: StationId) -> Option<&BTreeMap<StationId, u32>> {
        self.rows.get(&from)
    }
}
