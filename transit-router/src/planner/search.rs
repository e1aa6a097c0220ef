//! Earliest-arrival route search over the timetable.
//!
//! The search is a label-setting walk over the implicit time-expanded graph:
//! partial routes are popped from a priority queue in order of elapsed
//! minutes, and the first route popped for a station is that station's best
//! route. Edges are only generated on demand by iterating a station's
//! departures from the current arrival time.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet, BinaryHeap};
use std::sync::Arc;

use tracing::{debug, trace};

use crate::domain::{ClockTime, Edge, StationId};
use crate::network::TransitNetwork;

use super::cancel::CancelToken;
use super::config::SearchConfig;
use super::route::{Route, StationSet};

/// Error from route search.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SearchError {
    /// A station id does not belong to the searched network
    #[error("unknown station {0}")]
    UnknownStation(StationId),

    /// Invalid search request
    #[error("invalid search request: {0}")]
    InvalidRequest(String),

    /// The caller cancelled the search before it finished
    #[error("search cancelled")]
    Cancelled,

    /// A background search task failed to complete
    #[error("search worker failed: {0}")]
    Worker(String),
}

/// The stations a search should resolve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destinations {
    /// Every station of the network.
    All,
    /// Only the listed stations.
    Only(BTreeSet<StationId>),
}

impl Destinations {
    /// A single destination.
    pub fn single(station: StationId) -> Self {
        Self::Only(BTreeSet::from([station]))
    }

    fn to_station_set(&self, station_count: usize) -> StationSet {
        match self {
            Self::All => StationSet::full(station_count),
            Self::Only(ids) => {
                let mut set = StationSet::new(station_count);
                for id in ids {
                    set.insert(*id);
                }
                set
            }
        }
    }
}

impl FromIterator<StationId> for Destinations {
    fn from_iter<I: IntoIterator<Item = StationId>>(iter: I) -> Self {
        Self::Only(iter.into_iter().collect())
    }
}

/// Request for route search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    /// Where the rider starts.
    pub source: StationId,

    /// Stations to find routes to.
    pub destinations: Destinations,

    /// When the rider is ready to leave `source`.
    pub start: ClockTime,

    /// Minimum minutes between arriving and departing on a different tour.
    pub min_transfer_mins: i64,

    /// Routes taking longer than this many minutes are discarded.
    pub max_duration_mins: i64,
}

impl SearchRequest {
    /// Create a new search request.
    pub fn new(
        source: StationId,
        destinations: Destinations,
        start: ClockTime,
        min_transfer_mins: i64,
        max_duration_mins: i64,
    ) -> Self {
        Self {
            source,
            destinations,
            start,
            min_transfer_mins,
            max_duration_mins,
        }
    }

    /// Create a request using the transfer and duration limits of `config`.
    pub fn with_config(
        source: StationId,
        destinations: Destinations,
        start: ClockTime,
        config: &SearchConfig,
    ) -> Self {
        Self::new(
            source,
            destinations,
            start,
            config.min_transfer_mins,
            config.max_duration_mins,
        )
    }

    /// Validate the search request against the network it will run on.
    pub fn validate(&self, network: &TransitNetwork) -> Result<(), SearchError> {
        if !network.contains(self.source) {
            return Err(SearchError::UnknownStation(self.source));
        }

        if let Destinations::Only(ids) = &self.destinations {
            if let Some(unknown) = ids.iter().find(|id| !network.contains(**id)) {
                return Err(SearchError::UnknownStation(*unknown));
            }
        }

        if self.min_transfer_mins < 0 {
            return Err(SearchError::InvalidRequest(
                "minimum transfer time must not be negative".to_string(),
            ));
        }

        if self.max_duration_mins < 0 {
            return Err(SearchError::InvalidRequest(
                "maximum duration must not be negative".to_string(),
            ));
        }

        Ok(())
    }
}

/// Result of route search.
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    /// The station the search started from.
    pub source: StationId,

    /// The start time of the search.
    pub start: ClockTime,

    /// Best route per reached station. The source maps to `None`, the empty
    /// route; stations that were never reached are absent.
    pub routes: BTreeMap<StationId, Option<Arc<Route>>>,

    /// Number of partial routes taken off the queue.
    pub routes_explored: usize,
}

impl SearchOutcome {
    /// Whether a route to `station` was found.
    pub fn is_reachable(&self, station: StationId) -> bool {
        self.routes.contains_key(&station)
    }

    /// Elapsed minutes of the best route to `station`; zero for the source.
    pub fn elapsed(&self, station: StationId) -> Option<u32> {
        self.routes
            .get(&station)
            .map(|route| route.as_ref().map_or(0, |r| r.elapsed()))
    }

    /// Edges of the best route to `station`, oldest first; empty for the source.
    pub fn edges(&self, station: StationId) -> Option<Vec<Edge>> {
        self.routes
            .get(&station)
            .map(|route| route.as_ref().map_or_else(Vec::new, |r| r.to_edges()))
    }
}

/// Queue entry ordered so that `BinaryHeap` pops the shortest route first,
/// and among equally long routes the one pushed first.
struct Queued {
    elapsed: u32,
    seq: u64,
    route: Arc<Route>,
}

impl PartialEq for Queued {
    fn eq(&self, other: &Self) -> bool {
        self.elapsed == other.elapsed && self.seq == other.seq
    }
}

impl Eq for Queued {}

impl Ord for Queued {
    fn cmp(&self, other: &Self) -> Ordering {
        // flipped for a min-heap
        other
            .elapsed
            .cmp(&self.elapsed)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for Queued {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Min-queue of partial routes with deterministic tie-breaking.
#[derive(Default)]
struct RouteQueue {
    heap: BinaryHeap<Queued>,
    pushed: u64,
}

impl RouteQueue {
    fn push(&mut self, route: Route) {
        self.heap.push(Queued {
            elapsed: route.elapsed(),
            seq: self.pushed,
            route: Arc::new(route),
        });
        self.pushed += 1;
    }

    fn pop(&mut self) -> Option<Arc<Route>> {
        self.heap.pop().map(|queued| queued.route)
    }
}

/// Route search over one network.
///
/// The network is only read, so any number of searches may run against it
/// concurrently; each owns its queue and results.
pub struct RouteSearch<'a> {
    network: &'a TransitNetwork,
    cancel: &'a CancelToken,
}

impl<'a> RouteSearch<'a> {
    /// Create a new search that polls `cancel` once per step.
    pub fn new(network: &'a TransitNetwork, cancel: &'a CancelToken) -> Self {
        Self { network, cancel }
    }

    /// Finds the best route to every requested station.
    ///
    /// Stops as soon as all requested stations are settled, or when no
    /// partial route within the duration limit remains. Returns
    /// [`SearchError::Cancelled`] if the token fires first.
    pub fn run(&self, request: &SearchRequest) -> Result<SearchOutcome, SearchError> {
        request.validate(self.network)?;

        let station_count = self.network.station_count();
        let source = request.source;
        let start = request.start;
        let min_transfer = clamp_minutes(request.min_transfer_mins);
        let max_duration = clamp_minutes(request.max_duration_mins);

        let mut pending = request.destinations.to_station_set(station_count);
        pending.remove(source);

        debug!(
            source = %source,
            start = %start,
            destinations = pending.len(),
            min_transfer,
            max_duration,
            "Starting route search"
        );

        let mut best: Vec<Option<Arc<Route>>> = vec![None; station_count];
        let mut queue = RouteQueue::default();

        for edge in self.network.departures(source, start) {
            let route = Route::first(start, *edge, station_count);
            if route.elapsed() <= max_duration {
                queue.push(route);
            }
        }

        let mut routes_explored = 0;

        while !pending.is_empty() {
            if self.cancel.is_cancelled() {
                debug!(source = %source, routes_explored, "Route search cancelled");
                return Err(SearchError::Cancelled);
            }
            let Some(current) = queue.pop() else {
                break;
            };
            routes_explored += 1;

            let last = *current.last();
            let station = last.to();
            let arrival = last.arrival();

            let settled = best[station.index()].clone();
            if settled.is_none() {
                trace!(
                    station = %station,
                    elapsed = current.elapsed(),
                    edges = current.edge_count(),
                    "Station settled"
                );
                best[station.index()] = Some(Arc::clone(&current));
                pending.remove(station);
            }

            for next in self.network.departures(station, arrival) {
                if current.elapsed_if_extended(next) > max_duration || current.contains(next.to()) {
                    continue;
                }

                let same_tour = last.same_tour(next);
                if !same_tour && arrival.minutes_to(next.departure()) < min_transfer {
                    // not enough time to change
                    continue;
                }

                if let Some(settled) = &settled {
                    // From the settled arrival the rider could take this edge as
                    // well, unless it continues a tour the settled arrival could
                    // not change onto in time.
                    let caught_up = settled.last().arrival().minutes_to(arrival) < min_transfer;
                    if !(same_tour && caught_up) {
                        continue;
                    }
                }

                queue.push(current.extended_by(*next));
            }
        }

        let mut routes: BTreeMap<StationId, Option<Arc<Route>>> = best
            .into_iter()
            .flatten()
            .map(|route| (route.destination(), Some(route)))
            .collect();
        routes.insert(source, None);

        debug!(
            source = %source,
            reached = routes.len() - 1,
            unresolved = pending.len(),
            routes_explored,
            "Route search complete"
        );

        Ok(SearchOutcome {
            source,
            start,
            routes,
            routes_explored,
        })
    }
}

/// Validated minute counts are non-negative; larger than `u32` saturates.
fn clamp_minutes(minutes: i64) -> u32 {
    u32::try_from(minutes.max(0)).unwrap_or(u32::MAX)
}

#[cfg(test)]
#[path = "search_tests.rs"]
mod search_tests;
