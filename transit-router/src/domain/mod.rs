//! Domain types for the transit router.
//!
//! This module contains the value types the routing engine works with.
//! Types enforce their invariants at construction time, so code that
//! receives them can trust their validity.

mod edge;
mod error;
mod line;
mod station;
mod time;

pub use edge::{Edge, TourId};
pub use error::GraphError;
pub use line::{Line, LineId};
pub use station::{Station, StationId};
pub use time::{
    ClockTime, HOURS_PER_DAY, MINUTES_PER_DAY, MINUTES_PER_HOUR, TimeError, format_minutes,
};
