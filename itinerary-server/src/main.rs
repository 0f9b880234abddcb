use std::net::SocketAddr;

use itinerary_server::cache::{CacheConfig, CachedOracle};
use itinerary_server::planner::PlannerConfig;
use itinerary_server::routing::{MockOracle, RoutingClient, RoutingConfig};
use itinerary_server::web::{AppState, PlannerOracle, create_router};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// Default listen address.
const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    if let Err(e) = run().await {
        error!("{e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let oracle = match std::env::var("ROUTING_MOCK_FILE") {
        Ok(path) => {
            let mock = MockOracle::from_file(&path)?;
            info!(%path, routes = mock.len(), "Using mock routing oracle");
            PlannerOracle::Mock(mock)
        }
        Err(_) => PlannerOracle::Live(live_oracle()?),
    };

    let state = AppState::new(oracle, PlannerConfig::default());
    let app = create_router(state);

    let addr: SocketAddr = std::env::var("BIND_ADDR")
        .unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string())
        .parse()?;

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "Itinerary planner listening");
    info!("  GET  /health          - Health check");
    info!("  POST /itinerary/plan  - Plan a day's journeys");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Build the cached live oracle from the environment.
fn live_oracle() -> Result<CachedOracle<RoutingClient>, Box<dyn std::error::Error>> {
    let api_key = std::env::var("ROUTING_API_KEY").unwrap_or_else(|_| {
        warn!("ROUTING_API_KEY not set. API calls will fail.");
        String::new()
    });

    let mut config = RoutingConfig::new(api_key);
    if let Ok(url) = std::env::var("ROUTING_BASE_URL") {
        config = config.with_base_url(url);
    }
    if let Ok(offset) = std::env::var("ROUTING_UTC_OFFSET_MINS") {
        config = config.with_utc_offset_mins(offset.parse()?);
    }

    let client = RoutingClient::new(config)?;
    Ok(CachedOracle::new(client, &CacheConfig::default()))
}
