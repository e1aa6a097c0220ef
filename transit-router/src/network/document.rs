//! JSON network documents.
//!
//! A document lists stations and scheduled edges. Edges refer to stations by
//! their position in the `stations` array and to lines by name:
//!
//! ```json
//! {
//!   "max_time_hours": 3,
//!   "stations": [{ "name": "A" }, { "name": "B", "x": 10.0, "y": 4.5 }],
//!   "edges": [
//!     { "from": 0, "to": 1, "line": "B1", "tour": 7, "departure": "08:00", "arrival": "08:04" }
//!   ]
//! }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use super::{NetworkBuilder, TransitNetwork};
use crate::domain::{ClockTime, GraphError, StationId, TourId};

/// Error loading a network document.
#[derive(Debug, thiserror::Error)]
pub enum NetworkLoadError {
    /// The document could not be read
    #[error("failed to read network document: {0}")]
    Io(#[from] std::io::Error),

    /// The document is not valid JSON for the expected schema
    #[error("malformed network document: {0}")]
    Json(#[from] serde_json::Error),

    /// The document describes an invalid graph
    #[error("invalid network: {0}")]
    Graph(#[from] GraphError),
}

/// A station entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StationRecord {
    pub name: String,
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
}

/// An edge entry. `from` and `to` index into the station list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EdgeRecord {
    pub from: u32,
    pub to: u32,
    pub line: String,
    pub tour: u32,
    pub departure: ClockTime,
    pub arrival: ClockTime,
}

/// The serialized form of a [`TransitNetwork`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NetworkDocument {
    #[serde(default)]
    pub max_time_hours: Option<u32>,
    pub stations: Vec<StationRecord>,
    #[serde(default)]
    pub edges: Vec<EdgeRecord>,
}

impl NetworkDocument {
    /// Builds the network described by this document.
    pub fn into_network(self) -> Result<TransitNetwork, GraphError> {
        let mut builder = NetworkBuilder::new();
        if let Some(hours) = self.max_time_hours {
            builder.max_time_hours(hours);
        }
        for station in self.stations {
            builder.add_station(station.name, station.x, station.y)?;
        }
        for edge in self.edges {
            let line = builder.line(&edge.line)?;
            builder.add_edge(
                StationId(edge.from),
                line,
                TourId(edge.tour),
                StationId(edge.to),
                edge.departure,
                edge.arrival,
            )?;
        }
        Ok(builder.build())
    }
}

impl TransitNetwork {
    /// Parses and builds a network from a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self, NetworkLoadError> {
        let document: NetworkDocument = serde_json::from_str(json)?;
        Ok(document.into_network()?)
    }

    /// Reads, parses and builds a network from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, NetworkLoadError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let network = Self::from_json_str(&json)?;
        info!(
            path = %path.display(),
            stations = network.station_count(),
            lines = network.lines().len(),
            edges = network.edge_count(),
            "Loaded network document"
        );
        Ok(network)
    }
}
