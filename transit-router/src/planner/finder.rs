//! Query facade over the route search.

use std::collections::BTreeMap;

use crate::domain::{ClockTime, Edge, StationId};
use crate::network::TransitNetwork;

use super::cancel::CancelToken;
use super::route::Route;
use super::search::{Destinations, RouteSearch, SearchError, SearchOutcome, SearchRequest};

/// A routing strategy that can answer [`SearchRequest`]s.
pub trait RoutingAlgorithm: Send + Sync {
    /// Human-readable name of the algorithm.
    fn name(&self) -> &'static str;

    /// One result per station resolved by the search, ordered by station id.
    fn find_routes(
        &self,
        network: &TransitNetwork,
        request: &SearchRequest,
        cancel: &CancelToken,
    ) -> Result<Vec<RouteResult>, SearchError>;
}

/// The outcome of a query for one destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteResult {
    pub from: StationId,
    /// `None` when no usable route was produced.
    pub to: Option<StationId>,
    /// Elapsed minutes from `start` to the final arrival.
    pub minutes: Option<u32>,
    pub edges: Vec<Edge>,
    pub start: ClockTime,
}

impl RouteResult {
    fn new(from: StationId, to: StationId, route: Option<&Route>, start: ClockTime) -> Self {
        match route {
            Some(route) => Self {
                from,
                to: Some(to),
                minutes: Some(route.elapsed()),
                edges: route.to_edges(),
                start,
            },
            None if from == to => Self {
                from,
                to: Some(to),
                minutes: Some(0),
                edges: Vec::new(),
                start,
            },
            None => Self {
                from,
                to: None,
                minutes: None,
                edges: Vec::new(),
                start,
            },
        }
    }

    pub fn is_reachable(&self) -> bool {
        self.to.is_some() && self.minutes.is_some()
    }

    /// Wall-clock arrival time.
    pub fn arrival(&self) -> Option<ClockTime> {
        self.minutes.map(|mins| self.start.later(i64::from(mins)))
    }

    /// Number of changes between tours along the route.
    pub fn transfers(&self) -> usize {
        self.edges
            .windows(2)
            .filter(|pair| !pair[0].same_tour(&pair[1]))
            .count()
    }
}

/// Exact earliest-arrival routing.
#[derive(Debug, Clone, Copy, Default)]
pub struct RouteFinder;

impl RouteFinder {
    pub fn new() -> Self {
        Self
    }

    fn search(
        &self,
        network: &TransitNetwork,
        request: &SearchRequest,
        cancel: &CancelToken,
    ) -> Result<SearchOutcome, SearchError> {
        RouteSearch::new(network, cancel).run(request)
    }

    /// Edge lists of the best route to every resolved station; the source
    /// maps to an empty list.
    pub fn find_routes_from(
        &self,
        network: &TransitNetwork,
        request: &SearchRequest,
        cancel: &CancelToken,
    ) -> Result<BTreeMap<StationId, Vec<Edge>>, SearchError> {
        let outcome = self.search(network, request, cancel)?;
        Ok(outcome
            .routes
            .into_iter()
            .map(|(station, route)| (station, route.map(|r| r.to_edges()).unwrap_or_default()))
            .collect())
    }

    /// The best route from `source` to `destination`, or `None` if there is
    /// none within `max_duration` minutes.
    #[allow(clippy::too_many_arguments)]
    pub fn find_route(
        &self,
        network: &TransitNetwork,
        source: StationId,
        destination: StationId,
        start: ClockTime,
        min_transfer: i64,
        max_duration: i64,
        cancel: &CancelToken,
    ) -> Result<Option<Vec<Edge>>, SearchError> {
        let request = SearchRequest::new(
            source,
            Destinations::single(destination),
            start,
            min_transfer,
            max_duration,
        );
        let mut routes = self.find_routes_from(network, &request, cancel)?;
        Ok(routes.remove(&destination))
    }
}

impl RoutingAlgorithm for RouteFinder {
    fn name(&self) -> &'static str {
        "Exact route finder"
    }

    fn find_routes(
        &self,
        network: &TransitNetwork,
        request: &SearchRequest,
        cancel: &CancelToken,
    ) -> Result<Vec<RouteResult>, SearchError> {
        let outcome = self.search(network, request, cancel)?;
        Ok(outcome
            .routes
            .iter()
            .map(|(station, route)| {
                RouteResult::new(outcome.source, *station, route.as_deref(), outcome.start)
            })
            .collect())
    }
}
