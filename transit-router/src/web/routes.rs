//! HTTP route handlers.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use tracing::{error, warn};

use crate::domain::{ClockTime, StationId};
use crate::network::TransitNetwork;
use crate::planner::{
    CancelToken, Destinations, RouteFinder, RoutingAlgorithm, SearchError, SearchRequest,
    station_distances,
};

use super::dto::*;
use super::state::AppState;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/stations", get(stations))
        .route("/route", get(route))
        .route("/routes", get(routes))
        .route("/distances", get(distances))
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// List every station of the network.
async fn stations(State(state): State<AppState>) -> Json<StationsResponse> {
    let stations = state
        .network
        .stations()
        .iter()
        .map(StationResult::from_station)
        .collect();

    Json(StationsResponse { stations })
}

/// Best route between two stations.
async fn route(
    State(state): State<AppState>,
    Query(query): Query<RouteQuery>,
) -> Result<Json<RouteResponse>, AppError> {
    let (from, to) = (StationId(query.from), StationId(query.to));
    let request = SearchRequest::new(
        from,
        Destinations::single(to),
        parse_start(query.time.as_deref(), &state)?,
        query.transfer.unwrap_or(state.config.min_transfer_mins),
        query.max.unwrap_or(state.config.max_duration_mins),
    );

    let results = run_blocking(Arc::clone(&state.network), move |network, cancel| {
        RouteFinder.find_routes(network, &request, cancel)
    })
    .await?;

    let found = results
        .iter()
        .find(|r| r.to == Some(to) && r.is_reachable())
        .ok_or_else(|| AppError::NotFound {
            message: format!("No route from station {from} to station {to}"),
        })?;

    Ok(Json(RouteResponse::from_result(found, &state.network)))
}

/// Best routes from one station to every station it can reach.
async fn routes(
    State(state): State<AppState>,
    Query(query): Query<RoutesQuery>,
) -> Result<Json<RoutesResponse>, AppError> {
    let from = StationId(query.from);
    let start = parse_start(query.time.as_deref(), &state)?;
    let request = SearchRequest::new(
        from,
        Destinations::All,
        start,
        query.transfer.unwrap_or(state.config.min_transfer_mins),
        query.max.unwrap_or(state.config.max_duration_mins),
    );

    let results = run_blocking(Arc::clone(&state.network), move |network, cancel| {
        RouteFinder.find_routes(network, &request, cancel)
    })
    .await?;

    let routes = results
        .iter()
        .map(|r| RouteResponse::from_result(r, &state.network))
        .collect();

    Ok(Json(RoutesResponse {
        from: from.0,
        start: start.to_string(),
        routes,
    }))
}

/// Travel-time distances from one station, cached per query.
async fn distances(
    State(state): State<AppState>,
    Query(query): Query<DistancesQuery>,
) -> Result<Json<DistancesResponse>, AppError> {
    let from = StationId(query.from);
    let start = parse_start(query.time.as_deref(), &state)?;
    let transfer = query.transfer.unwrap_or(state.config.min_transfer_mins);

    let network = Arc::clone(&state.network);
    let row = state
        .distances
        .get_or_compute((from, start, transfer), || {
            run_blocking(network, move |network, cancel| {
                station_distances(network, from, start, transfer, cancel)
            })
        })
        .await?;

    Ok(Json(DistancesResponse::from_row(from, start, &row)))
}

/// Parse the `time` parameter: `HH:MM`, `now`, or absent for the configured default.
fn parse_start(time: Option<&str>, state: &AppState) -> Result<ClockTime, AppError> {
    match time.map(str::trim) {
        None | Some("") => Ok(state.config.default_start),
        Some("now") => Ok(ClockTime::now()),
        Some(s) => ClockTime::parse_hhmm(s).map_err(|e| AppError::BadRequest {
            message: format!("Invalid time '{s}': {e}"),
        }),
    }
}

/// Runs a search on the blocking pool.
///
/// If the awaiting request is dropped (e.g. the client disconnects), the
/// search is cancelled instead of running to completion.
async fn run_blocking<T, F>(network: Arc<TransitNetwork>, search: F) -> Result<T, SearchError>
where
    T: Send + 'static,
    F: FnOnce(&TransitNetwork, &CancelToken) -> Result<T, SearchError> + Send + 'static,
{
    let cancel = CancelToken::new();
    let guard = cancel.drop_guard();

    let result = tokio::task::spawn_blocking(move || search(&network, &cancel))
        .await
        .map_err(|e| SearchError::Worker(e.to_string()))?;

    guard.disarm();
    result
}

// Error handling

#[derive(Debug)]
pub enum AppError {
    BadRequest { message: String },
    NotFound { message: String },
    Internal { message: String },
}

impl From<SearchError> for AppError {
    fn from(e: SearchError) -> Self {
        match e {
            SearchError::InvalidRequest(_) | SearchError::UnknownStation(_) => {
                AppError::BadRequest {
                    message: e.to_string(),
                }
            }
            SearchError::Cancelled | SearchError::Worker(_) => AppError::Internal {
                message: e.to_string(),
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            AppError::BadRequest { message } => (StatusCode::BAD_REQUEST, message),
            AppError::NotFound { message } => (StatusCode::NOT_FOUND, message),
            AppError::Internal { message } => (StatusCode::INTERNAL_SERVER_ERROR, message),
        };

        if status.is_server_error() {
            error!(%status, %message, "Request failed");
        } else {
            warn!(%status, %message, "Request rejected");
        }

        let body = Json(ErrorResponse { error: message });
        (status, body).into_response()
    }
}
