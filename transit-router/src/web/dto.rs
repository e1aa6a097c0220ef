//! Data transfer objects for web requests and responses.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::{ClockTime, Edge, Station, StationId, format_minutes};
use crate::network::TransitNetwork;
use crate::planner::RouteResult;

/// A station in the network listing.
#[derive(Debug, Serialize)]
pub struct StationResult {
    pub id: u32,
    pub name: String,
    pub x: f64,
    pub y: f64,
}

/// Response listing every station.
#[derive(Debug, Serialize)]
pub struct StationsResponse {
    pub stations: Vec<StationResult>,
}

/// Query for a single route.
#[derive(Debug, Deserialize)]
pub struct RouteQuery {
    /// Source station id
    pub from: u32,

    /// Destination station id
    pub to: u32,

    /// Start time in HH:MM format, or "now" (defaults to the configured start)
    pub time: Option<String>,

    /// Minimum transfer minutes (defaults to the configured value)
    pub transfer: Option<i64>,

    /// Maximum route duration in minutes (defaults to the configured value)
    pub max: Option<i64>,
}

/// Query for routes to every station.
#[derive(Debug, Deserialize)]
pub struct RoutesQuery {
    pub from: u32,
    pub time: Option<String>,
    pub transfer: Option<i64>,
    pub max: Option<i64>,
}

/// Query for travel-time distances from one station.
#[derive(Debug, Deserialize)]
pub struct DistancesQuery {
    pub from: u32,
    pub time: Option<String>,
    pub transfer: Option<i64>,
}

/// One scheduled edge of a route.
#[derive(Debug, Serialize)]
pub struct EdgeResult {
    pub from: u32,
    pub from_name: String,
    pub to: u32,
    pub to_name: String,
    pub line: String,
    pub tour: u32,
    /// Departure time (HH:MM)
    pub departure: String,
    /// Arrival time (HH:MM)
    pub arrival: String,
}

/// A route from the source to one station.
#[derive(Debug, Serialize)]
pub struct RouteResponse {
    pub from: u32,
    pub to: Option<u32>,
    pub reachable: bool,
    /// Elapsed minutes from the start time
    pub minutes: Option<u32>,
    /// Elapsed time formatted for display (e.g., "1h 05min")
    pub duration: Option<String>,
    /// Arrival time (HH:MM)
    pub arrival: Option<String>,
    pub transfers: usize,
    pub edges: Vec<EdgeResult>,
}

/// Routes from one source to every reached station.
#[derive(Debug, Serialize)]
pub struct RoutesResponse {
    pub from: u32,
    /// Start time (HH:MM)
    pub start: String,
    pub routes: Vec<RouteResponse>,
}

/// Travel-time distances from one station, keyed by station id.
#[derive(Debug, Serialize)]
pub struct DistancesResponse {
    pub from: u32,
    pub start: String,
    pub distances: BTreeMap<u32, u32>,
}

/// Error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

// Conversion implementations

fn station_name(network: &TransitNetwork, id: StationId) -> String {
    network
        .station(id)
        .map(|s| s.name().to_string())
        .unwrap_or_else(|| id.to_string())
}

impl StationResult {
    pub fn from_station(station: &Station) -> Self {
        let (x, y) = station.default_position();
        Self {
            id: station.id().0,
            name: station.name().to_string(),
            x,
            y,
        }
    }
}

impl EdgeResult {
    /// Create from a network edge, resolving station and line names.
    pub fn from_edge(edge: &Edge, network: &TransitNetwork) -> Self {
        Self {
            from: edge.from().0,
            from_name: station_name(network, edge.from()),
            to: edge.to().0,
            to_name: station_name(network, edge.to()),
            line: network
                .line(edge.line())
                .map(|l| l.name().to_string())
                .unwrap_or_default(),
            tour: edge.tour().0,
            departure: edge.departure().to_string(),
            arrival: edge.arrival().to_string(),
        }
    }
}

impl RouteResponse {
    /// Create from a planner result.
    pub fn from_result(result: &RouteResult, network: &TransitNetwork) -> Self {
        Self {
            from: result.from.0,
            to: result.to.map(|id| id.0),
            reachable: result.is_reachable(),
            minutes: result.minutes,
            duration: result.minutes.map(format_minutes),
            arrival: result.arrival().map(|t| t.to_string()),
            transfers: result.transfers(),
            edges: result
                .edges
                .iter()
                .map(|e| EdgeResult::from_edge(e, network))
                .collect(),
        }
    }
}

impl DistancesResponse {
    pub fn from_row(from: StationId, start: ClockTime, row: &BTreeMap<StationId, u32>) -> Self {
        Self {
            from: from.0,
            start: start.to_string(),
            distances: row.iter().map(|(id, mins)| (id.0, *mins)).collect(),
        }
    }
}
