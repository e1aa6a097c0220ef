//! Scheduled trips between two stations.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::{ClockTime, LineId, StationId};

/// One concrete run of a vehicle on a line.
///
/// Tour ids only distinguish runs of the same line; tour 3 of two different
/// lines are unrelated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TourId(pub u32);

/// A directed, scheduled trip from one station to the next.
///
/// An arrival clock value earlier than the departure means the trip crosses
/// midnight. Edges are plain values: equality compares every field.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Edge {
    from: StationId,
    to: StationId,
    line: LineId,
    tour: TourId,
    departure: ClockTime,
    arrival: ClockTime,
}

impl Edge {
    pub fn new(
        from: StationId,
        to: StationId,
        line: LineId,
        tour: TourId,
        departure: ClockTime,
        arrival: ClockTime,
    ) -> Self {
        Self {
            from,
            to,
            line,
            tour,
            departure,
            arrival,
        }
    }

    pub fn from(&self) -> StationId {
        self.from
    }

    pub fn to(&self) -> StationId {
        self.to
    }

    pub fn line(&self) -> LineId {
        self.line
    }

    pub fn tour(&self) -> TourId {
        self.tour
    }

    pub fn departure(&self) -> ClockTime {
        self.departure
    }

    pub fn arrival(&self) -> ClockTime {
        self.arrival
    }

    /// Minutes spent on board, wrapping over midnight.
    pub fn travel_minutes(&self) -> u32 {
        self.departure.minutes_to(self.arrival)
    }

    /// Whether `next` continues the same vehicle run from where this edge ends.
    ///
    /// A rider staying on board needs no transfer time between such edges.
    pub fn same_tour(&self, next: &Edge) -> bool {
        self.line == next.line && self.tour == next.tour && self.to == next.from
    }
}

impl fmt::Debug for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Edge({} {} -> {} {}, line {}, tour {})",
            self.from, self.departure, self.to, self.arrival, self.line.0, self.tour.0
        )
    }
}
