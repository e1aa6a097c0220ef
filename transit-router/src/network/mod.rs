//! The transit graph.
//!
//! A [`TransitNetwork`] owns every station, line and edge. It is assembled
//! once through a [`NetworkBuilder`] and is read-only afterwards, so any
//! number of searches can share it (typically behind an `Arc`).

mod departures;
mod document;

use std::collections::HashMap;

use tracing::debug;

use crate::domain::{
    ClockTime, Edge, GraphError, HOURS_PER_DAY, Line, LineId, Station, StationId, TourId,
};

pub use departures::Departures;
pub use document::{EdgeRecord, NetworkDocument, NetworkLoadError, StationRecord};

/// A read-only, timetabled transit graph.
#[derive(Debug, Clone)]
pub struct TransitNetwork {
    stations: Vec<Station>,
    /// Outgoing edges per station index, stably sorted by departure.
    edges: Vec<Vec<Edge>>,
    lines: Vec<Line>,
    max_time_hours: u32,
}

impl TransitNetwork {
    /// Returns the station with the given id, if it belongs to this network.
    pub fn station(&self, id: StationId) -> Option<&Station> {
        self.stations.get(id.index())
    }

    /// Whether `id` was issued by this network.
    pub fn contains(&self, id: StationId) -> bool {
        id.index() < self.stations.len()
    }

    /// All stations in id order.
    pub fn stations(&self) -> &[Station] {
        &self.stations
    }

    pub fn station_count(&self) -> usize {
        self.stations.len()
    }

    /// Finds a station by its exact name.
    pub fn find_station(&self, name: &str) -> Option<&Station> {
        self.stations.iter().find(|s| s.name() == name)
    }

    pub fn line(&self, id: LineId) -> Option<&Line> {
        self.lines.get(id.0 as usize)
    }

    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    /// Outgoing edges of a station, sorted by departure.
    ///
    /// Unknown stations have no edges.
    pub fn edges_from(&self, id: StationId) -> &[Edge] {
        self.edges
            .get(id.index())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Outgoing edges of a station, starting with the earliest departure at
    /// or after `from` and wrapping around the day once.
    pub fn departures(&self, id: StationId, from: ClockTime) -> Departures<'_> {
        Departures::new(self.edges_from(id), from)
    }

    /// Total number of edges in the network.
    pub fn edge_count(&self) -> usize {
        self.edges.iter().map(Vec::len).sum()
    }

    /// Default upper bound on route durations, in hours.
    pub fn max_time_hours(&self) -> u32 {
        self.max_time_hours
    }
}

/// Incremental construction of a [`TransitNetwork`].
///
/// # Examples
///
/// ```
/// use transit_router::domain::{ClockTime, TourId};
/// use transit_router::network::NetworkBuilder;
///
/// let mut builder = NetworkBuilder::new();
/// let a = builder.add_station("A", 0.0, 0.0).unwrap();
/// let b = builder.add_station("B", 1.0, 0.0).unwrap();
/// let line = builder.line("B1").unwrap();
/// let t = |s| ClockTime::parse_hhmm(s).unwrap();
/// builder.add_edge(a, line, TourId(1), b, t("08:00"), t("08:05")).unwrap();
///
/// let network = builder.build();
/// assert_eq!(network.edges_from(a).len(), 1);
/// ```
#[derive(Debug, Default)]
pub struct NetworkBuilder {
    stations: Vec<Station>,
    edges: Vec<Vec<Edge>>,
    lines: Vec<Line>,
    line_ids: HashMap<String, LineId>,
    max_time_hours: Option<u32>,
}

impl NetworkBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a station and returns its freshly assigned id.
    pub fn add_station(
        &mut self,
        name: impl Into<String>,
        default_x: f64,
        default_y: f64,
    ) -> Result<StationId, GraphError> {
        let name = name.into();
        if name.is_empty() {
            return Err(GraphError::EmptyStationName);
        }
        let id = StationId(self.stations.len() as u32);
        self.stations.push(Station::new(id, name, default_x, default_y));
        self.edges.push(Vec::new());
        Ok(id)
    }

    /// Returns the id of the line with this name, creating it on first use.
    pub fn line(&mut self, name: &str) -> Result<LineId, GraphError> {
        if name.is_empty() {
            return Err(GraphError::EmptyLineName);
        }
        if let Some(id) = self.line_ids.get(name) {
            return Ok(*id);
        }
        let id = LineId(self.lines.len() as u32);
        self.lines.push(Line::new(id, name.to_string()));
        self.line_ids.insert(name.to_string(), id);
        Ok(id)
    }

    /// Adds a scheduled trip of `tour` on `line` from `from` to `to`.
    pub fn add_edge(
        &mut self,
        from: StationId,
        line: LineId,
        tour: TourId,
        to: StationId,
        departure: ClockTime,
        arrival: ClockTime,
    ) -> Result<Edge, GraphError> {
        for id in [from, to] {
            if id.index() >= self.stations.len() {
                return Err(GraphError::UnknownStation(id));
            }
        }
        if from == to {
            return Err(GraphError::SelfLoop {
                station: from,
                departure,
            });
        }
        let edge = Edge::new(from, to, line, tour, departure, arrival);
        self.edges[from.index()].push(edge);
        Ok(edge)
    }

    /// Overrides the default route duration bound (24 hours).
    pub fn max_time_hours(&mut self, hours: u32) -> &mut Self {
        self.max_time_hours = Some(hours);
        self
    }

    /// Freezes the network, ordering each station's edges by departure.
    pub fn build(self) -> TransitNetwork {
        let mut edges = self.edges;
        for list in &mut edges {
            // stable: simultaneous departures keep insertion order
            list.sort_by_key(Edge::departure);
        }

        let network = TransitNetwork {
            stations: self.stations,
            edges,
            lines: self.lines,
            max_time_hours: self.max_time_hours.unwrap_or(HOURS_PER_DAY),
        };

        debug!(
            stations = network.station_count(),
            lines = network.lines().len(),
            edges = network.edge_count(),
            "Transit network built"
        );

        network
    }
}
