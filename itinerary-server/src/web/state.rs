//! Application state for the web layer.

use std::sync::Arc;

use chrono::NaiveDateTime;

use crate::cache::CachedOracle;
use crate::domain::{Location, TravelEstimate};
use crate::planner::{OracleError, PlannerConfig, RoutingOracle};
use crate::routing::{MockOracle, RoutingClient};

/// The oracle the server plans against.
pub enum PlannerOracle {
    /// Live directions API behind a cache
    Live(CachedOracle<RoutingClient>),

    /// Fixture-backed mock
    Mock(MockOracle),
}

impl RoutingOracle for PlannerOracle {
    async fn estimate_travel(
        &self,
        origin: &Location,
        destination: &Location,
        departure: NaiveDateTime,
    ) -> Result<TravelEstimate, OracleError> {
        match self {
            PlannerOracle::Live(oracle) => {
                oracle.estimate_travel(origin, destination, departure).await
            }
            PlannerOracle::Mock(oracle) => {
                oracle.estimate_travel(origin, destination, departure).await
            }
        }
    }
}

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Routing oracle, shared by all requests
    pub oracle: Arc<PlannerOracle>,

    /// Planner configuration
    pub config: Arc<PlannerConfig>,
}

impl AppState {
    /// Create a new app state.
    pub fn new(oracle: PlannerOracle, config: PlannerConfig) -> Self {
        Self {
            oracle: Arc::new(oracle),
            config: Arc::new(config),
        }
    }
}
