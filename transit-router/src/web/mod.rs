//! Web layer for the transit router.
//!
//! Provides JSON endpoints for listing stations, planning routes and
//! querying travel-time distances.

mod dto;
mod routes;
mod state;

pub use dto::*;
pub use routes::{AppError, create_router};
pub use state::AppState;
