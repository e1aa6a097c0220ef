//! Earliest-arrival route planning.
//!
//! This module answers: "leaving this station at this time, what is the
//! quickest way to each other station?"
//!
//! The search walks partial routes in order of elapsed minutes, expanding
//! each station's departures lazily and honouring a minimum transfer time
//! between tours. Queries go through [`RouteFinder`].

mod cancel;
mod config;
mod distances;
mod finder;
mod route;
mod search;

pub use cancel::{CancelOnDrop, CancelToken};
pub use config::{ENV_MAX_DURATION, ENV_MIN_TRANSFER, ENV_START_TIME, SearchConfig};
pub use distances::{DistanceTable, station_distances};
pub use finder::{RouteFinder, RouteResult, RoutingAlgorithm};
pub use route::Route;
pub use search::{Destinations, RouteSearch, SearchError, SearchOutcome, SearchRequest};
