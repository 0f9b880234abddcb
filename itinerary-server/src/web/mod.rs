//! Web layer for the itinerary planner.
//!
//! Provides the HTTP endpoint for planning a day's journeys.

mod dto;
mod routes;
mod state;

pub use dto::*;
pub use routes::{AppError, create_router};
pub use state::{AppState, PlannerOracle};
