use std::net::SocketAddr;
use std::process::ExitCode;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use transit_router::cache::CacheConfig;
use transit_router::network::TransitNetwork;
use transit_router::planner::SearchConfig;
use transit_router::web::{AppState, create_router};

/// Environment variable naming the network document, if not given as an argument.
const ENV_NETWORK: &str = "TRANSIT_NETWORK";

/// Environment variable overriding the listen address.
const ENV_ADDR: &str = "TRANSIT_ADDR";

const DEFAULT_ADDR: &str = "127.0.0.1:3000";

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();

    let Some(path) = std::env::args()
        .nth(1)
        .or_else(|| std::env::var(ENV_NETWORK).ok())
    else {
        error!("No network document given; pass a path or set {ENV_NETWORK}");
        return ExitCode::FAILURE;
    };

    let network = match TransitNetwork::from_json_file(&path) {
        Ok(network) => network,
        Err(e) => {
            error!(%path, error = %e, "Failed to load network");
            return ExitCode::FAILURE;
        }
    };

    let addr_text = std::env::var(ENV_ADDR).unwrap_or_else(|_| DEFAULT_ADDR.to_string());
    let addr: SocketAddr = match addr_text.parse() {
        Ok(addr) => addr,
        Err(e) => {
            error!(addr = %addr_text, error = %e, "Invalid listen address");
            return ExitCode::FAILURE;
        }
    };

    let search_config = SearchConfig::from_env();
    info!(
        min_transfer = search_config.min_transfer_mins,
        max_duration = search_config.max_duration_mins,
        default_start = %search_config.default_start,
        "Search defaults"
    );

    let state = AppState::new(network, search_config, &CacheConfig::default());
    let app = create_router(state);

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!(%addr, error = %e, "Failed to bind");
            return ExitCode::FAILURE;
        }
    };

    info!(%addr, "Transit router listening");
    info!("Endpoints: GET /health /stations /route /routes /distances");

    if let Err(e) = axum::serve(listener, app).await {
        error!(error = %e, "Server error");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
