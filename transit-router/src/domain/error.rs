//! Domain error types.
//!
//! These errors represent invalid network construction. They are distinct
//! from I/O and query errors.

use super::{ClockTime, StationId};

/// Errors raised while assembling a transit network.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GraphError {
    /// An edge refers to a station the network does not contain
    #[error("unknown station {0}")]
    UnknownStation(StationId),

    /// An edge starts and ends at the same station
    #[error("edge at {departure} loops on station {station}")]
    SelfLoop {
        station: StationId,
        departure: ClockTime,
    },

    /// Station names must be non-empty
    #[error("station name must not be empty")]
    EmptyStationName,

    /// Line names must be non-empty
    #[error("line name must not be empty")]
    EmptyLineName,
}
